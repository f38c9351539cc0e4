//! Persistence adapters
//!
//! Two concerns live here. [`SessionStore`] holds a player's opaque session blob
//! per day key. [`PuzzleStore`] holds the shared daily puzzle, which is written
//! at most once per day key. Both come in an in-memory flavor for tests and a
//! file-backed flavor for the terminal client.

use crate::error::StoreError;
use crate::puzzle::Puzzle;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Per-player key/value storage for session blobs
pub trait SessionStore: Send + Sync {
    /// Blob stored under `key`, if any
    fn load_session(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the blob under `key`
    fn save_session(&self, key: &str, blob: &str) -> Result<(), StoreError>;

    /// Remove the blob under `key`; missing keys are not an error
    fn clear_session(&self, key: &str) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}

/// Shared storage for daily puzzles, keyed by day
pub trait PuzzleStore: Send + Sync {
    fn get_puzzle(&self, key: &str) -> Result<Option<Puzzle>, StoreError>;

    /// Store a puzzle under `key`.
    ///
    /// Fails with [`StoreError::AlreadyExists`] when the key is taken, so only
    /// one writer ever wins a given day.
    fn create_puzzle(&self, key: &str, puzzle: &Puzzle) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ==================== In-Memory Backend ====================

/// In-memory store for tests and ephemeral play
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, String>>,
    puzzles: Mutex<HashMap<String, Puzzle>>,
    available: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            puzzles: Mutex::new(HashMap::new()),
            available: Mutex::new(true),
        }
    }

    /// Set whether the store should accept reads and writes
    pub fn set_available(&self, available: bool) {
        *lock(&self.available) = available;
    }

    /// Number of stored puzzles
    pub fn puzzle_count(&self) -> usize {
        lock(&self.puzzles).len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if *lock(&self.available) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store offline".into()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemoryStore {
    fn load_session(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(lock(&self.sessions).get(key).cloned())
    }

    fn save_session(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.check()?;
        lock(&self.sessions).insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn clear_session(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        lock(&self.sessions).remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

impl PuzzleStore for MemoryStore {
    fn get_puzzle(&self, key: &str) -> Result<Option<Puzzle>, StoreError> {
        self.check()?;
        Ok(lock(&self.puzzles).get(key).cloned())
    }

    fn create_puzzle(&self, key: &str, puzzle: &Puzzle) -> Result<(), StoreError> {
        self.check()?;
        let mut puzzles = lock(&self.puzzles);
        if puzzles.contains_key(key) {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        puzzles.insert(key.to_string(), puzzle.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

// ==================== Local File Backend ====================

/// File-backed store: `<root>/sessions/<key>.json` and `<root>/puzzles/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_path(&self, key: &str) -> PathBuf {
        self.root.join("sessions").join(format!("{key}.json"))
    }

    fn puzzle_path(&self, key: &str) -> PathBuf {
        self.root.join("puzzles").join(format!("{key}.json"))
    }

    fn read(path: &Path, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn ensure_parent(path: &Path, key: &str) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                key: key.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn load_session(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::read(&self.session_path(key), key)
    }

    fn save_session(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        let path = self.session_path(key);
        Self::ensure_parent(&path, key)?;
        fs::write(&path, blob).map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })
    }

    fn clear_session(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.session_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn backend_name(&self) -> &'static str {
        "File"
    }
}

impl PuzzleStore for FileStore {
    fn get_puzzle(&self, key: &str) -> Result<Option<Puzzle>, StoreError> {
        let Some(json) = Self::read(&self.puzzle_path(key), key)? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    fn create_puzzle(&self, key: &str, puzzle: &Puzzle) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(puzzle).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;

        let path = self.puzzle_path(key);
        Self::ensure_parent(&path, key)?;

        // create_new makes the existence check and the write one step.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| match source.kind() {
                ErrorKind::AlreadyExists => StoreError::AlreadyExists(key.to_string()),
                _ => StoreError::Io {
                    key: key.to_string(),
                    source,
                },
            })?;

        file.write_all(json.as_bytes())
            .map_err(|source| StoreError::Io {
                key: key.to_string(),
                source,
            })
    }

    fn backend_name(&self) -> &'static str {
        "File"
    }
}
