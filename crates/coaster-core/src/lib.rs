//! Daily coaster connections engine
//!
//! This crate generates a daily puzzle of four groups of four roller coasters,
//! each group sharing one attribute no other group's coasters share, and runs
//! the single-player session that solves it.

mod catalog;
mod daily;
mod day;
mod error;
mod generator;
mod puzzle;
mod rules;
mod session;
mod store;

pub use catalog::{AttributeRef, Catalog, Item, MemoryCatalog, Quality};
pub use daily::provision_daily;
pub use day::{active_day, day_key, parse_day_key, DaySchedule, DEFAULT_ROLLOVER_HOUR};
pub use error::{CatalogError, GenerateError, ProvisionError, SessionError, StoreError};
pub use generator::{Generator, GeneratorConfig};
pub use puzzle::{CategoryColor, Group, Puzzle, GROUP_COUNT, GROUP_SIZE};
pub use rules::{MatchOp, Rule, RuleSet, RuleValue, REPLACE_MARKER};
pub use session::{
    GuessOutcome, HintView, Phase, Session, SessionState, SolvedRow, Tile, ViewModel, HINT_SLOTS,
    STARTING_MISTAKES,
};
pub use store::{FileStore, MemoryStore, PuzzleStore, SessionStore};
