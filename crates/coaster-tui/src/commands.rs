//! Non-interactive subcommands and the shared setup behind `play`.

use crate::config::Settings;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use coaster_core::{
    day_key, provision_daily, FileStore, Generator, MemoryCatalog, Puzzle, RuleSet, SessionState,
    SessionStore,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write as _;

/// Catalog shipped inside the binary, used when no catalog path is configured
const BUNDLED_CATALOG: &str = include_str!("../data/coasters.json");

pub fn load_catalog(settings: &Settings) -> Result<MemoryCatalog> {
    match &settings.catalog_path {
        Some(path) => MemoryCatalog::load(path).context("Failed to load coaster catalog"),
        None => {
            let catalog =
                MemoryCatalog::from_json(BUNDLED_CATALOG).context("Bundled catalog is invalid")?;
            tracing::debug!(items = catalog.len(), "using bundled catalog");
            Ok(catalog)
        }
    }
}

/// Make sure the day's puzzle exists in `store`, generating it if needed.
pub fn ensure_puzzle(
    settings: &Settings,
    store: &FileStore,
    day: NaiveDate,
    seed: Option<u64>,
) -> Result<Puzzle> {
    let catalog = load_catalog(settings)?;
    let mut generator = match seed {
        Some(seed) => Generator::with_rng(settings.generator, StdRng::seed_from_u64(seed)),
        None => Generator::with_config(settings.generator),
    };
    let puzzle = provision_daily(
        store,
        &catalog,
        &RuleSet::standard(),
        &mut generator,
        &settings.schedule(),
        day,
    )
    .with_context(|| format!("Failed to provision the puzzle for {}", day_key(day)))?;
    Ok(puzzle)
}

/// Human-readable listing of a puzzle's groups
pub fn describe_puzzle(puzzle: &Puzzle) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Coaster Connections #{} ({})",
        puzzle.number,
        day_key(puzzle.created)
    );
    for group in &puzzle.groups {
        let _ = writeln!(
            out,
            "{} {} - {}",
            group.color.glyph(),
            group.category(),
            group.explanation()
        );
        let _ = writeln!(out, "    {}", group.names().join(", "));
    }
    if puzzle.is_degraded() {
        let _ = writeln!(
            out,
            "warning: only {} of 4 groups could be generated",
            puzzle.groups.len()
        );
    }
    out
}

pub fn run_generate(settings: &Settings, store: &FileStore, day: NaiveDate, seed: Option<u64>) -> Result<()> {
    let puzzle = ensure_puzzle(settings, store, day, seed)?;
    print!("{}", describe_puzzle(&puzzle));
    Ok(())
}

/// Summary text for `day`, if a session was saved for it
pub fn share_text<S: SessionStore + ?Sized>(store: &S, day: NaiveDate) -> Result<Option<String>> {
    let key = day_key(day);
    let Some(blob) = store.load_session(&key)? else {
        return Ok(None);
    };
    let state: SessionState =
        serde_json::from_str(&blob).with_context(|| format!("Saved session for {key} is corrupt"))?;
    Ok((state.date == key).then_some(state.summary))
}

pub fn run_share(store: &FileStore, day: NaiveDate) -> Result<()> {
    match share_text(store, day)? {
        Some(summary) => println!("{summary}"),
        None => println!("No game saved for {}", day_key(day)),
    }
    Ok(())
}

pub fn run_reset(store: &FileStore, day: NaiveDate) -> Result<()> {
    let key = day_key(day);
    store.clear_session(&key)?;
    tracing::info!(day = %key, "session reset");
    println!("Cleared the saved game for {key}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coaster_core::{MemoryStore, PuzzleStore};
    use tempfile::TempDir;

    fn settings(dir: &TempDir) -> Settings {
        Settings {
            data_dir: dir.path().to_path_buf(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_bundled_catalog_parses() {
        let catalog = MemoryCatalog::from_json(BUNDLED_CATALOG).unwrap();
        assert!(catalog.len() >= 16);
    }

    #[test]
    fn test_bundled_catalog_fills_a_puzzle() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

        let puzzle = ensure_puzzle(&settings(&dir), &store, day, Some(2024)).unwrap();
        assert!(!puzzle.groups.is_empty());
        assert_eq!(puzzle.number, 73);
        assert_eq!(store.get_puzzle("2025-03-14").unwrap(), Some(puzzle.clone()));

        // A second run reuses the stored puzzle whatever the seed.
        let again = ensure_puzzle(&settings(&dir), &store, day, Some(1)).unwrap();
        assert_eq!(again, puzzle);
    }

    #[test]
    fn test_describe_puzzle_lists_groups() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let puzzle = ensure_puzzle(&settings(&dir), &store, day, Some(8)).unwrap();

        let text = describe_puzzle(&puzzle);
        assert!(text.starts_with("Coaster Connections #1 (2025-01-01)\n"));
        for group in &puzzle.groups {
            assert!(text.contains(&group.names().join(", ")));
        }
    }

    #[test]
    fn test_missing_catalog_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings(&dir);
        settings.catalog_path = Some(dir.path().join("nope.json"));
        assert!(load_catalog(&settings).is_err());
    }

    #[test]
    fn test_share_text() {
        let store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        assert_eq!(share_text(&store, day).unwrap(), None);

        let state = SessionState {
            date: "2025-05-05".into(),
            solved_groups: Vec::new(),
            board: Vec::new(),
            puzzle_groups: Vec::new(),
            mistakes_remaining: 5,
            hint1: false,
            hint2: false,
            hint3: false,
            finished: false,
            summary: "Coaster Connections #125\n".into(),
            puzzle_number: 125,
        };
        store
            .save_session("2025-05-05", &serde_json::to_string(&state).unwrap())
            .unwrap();
        assert_eq!(
            share_text(&store, day).unwrap().as_deref(),
            Some("Coaster Connections #125\n")
        );

        store.save_session("2025-05-05", "garbage").unwrap();
        assert!(share_text(&store, day).is_err());
    }
}
