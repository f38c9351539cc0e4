//! Error types for the puzzle engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a catalog while answering a query.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not a JSON array of coaster records.
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Remote or backing catalog is not reachable.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by a persistence adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored value exists but cannot be decoded.
    #[error("stored value for {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A puzzle for this day key was already created.
    #[error("a puzzle already exists for {0}")]
    AlreadyExists(String),

    /// Backing store is not reachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors that stop puzzle generation outright.
///
/// Search failures (rule exhaustion, depth bound, retry budget) are not errors;
/// they produce a degraded puzzle instead.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors from provisioning the daily puzzle.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// Another writer won the create race, yet its puzzle cannot be read back.
    #[error("puzzle for {0} was created concurrently but could not be read back")]
    Vanished(String),
}

/// Errors surfaced by the session state machine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No puzzle is stored for the active day.
    #[error("no puzzle available for {day}")]
    NoPuzzle { day: String },

    /// The stored puzzle has no groups to play.
    #[error("puzzle for {day} has no groups")]
    EmptyPuzzle { day: String },

    /// The puzzle store could not be read.
    #[error("puzzle for {day} unavailable: {source}")]
    Store {
        day: String,
        #[source]
        source: StoreError,
    },
}
