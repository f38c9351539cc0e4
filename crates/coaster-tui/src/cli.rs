//! Command-line arguments for the `coasters` binary.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "coasters",
    version,
    about = "Coaster Connections - find four groups of four roller coasters"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding settings, puzzles, sessions and logs.
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Coaster catalog JSON file (defaults to the bundled catalog).
    #[arg(long = "catalog", value_name = "PATH", global = true)]
    pub catalog: Option<PathBuf>,

    /// Local hour at which the next day's puzzle unlocks.
    #[arg(long = "rollover-hour", value_name = "HOUR", global = true)]
    pub rollover_hour: Option<u32>,

    /// Play or inspect a specific day instead of the active one.
    #[arg(long = "day", value_name = "YYYY-MM-DD", global = true)]
    pub day: Option<NaiveDate>,

    /// Write debug-level logs.
    #[arg(long = "debug", global = true)]
    pub debug: bool,
}

#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Play the day's puzzle in the terminal (default).
    Play,

    /// Provision the day's puzzle and print its groups.
    Generate {
        /// Seed the generator for a reproducible puzzle.
        #[arg(long = "seed")]
        seed: Option<u64>,
    },

    /// Print the shareable result for the day.
    Share,

    /// Delete the day's saved session.
    Reset,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Play)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_is_default() {
        let cli = Cli::parse_from(["coasters"]);
        assert_eq!(cli.command(), Command::Play);
        assert!(!cli.debug);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "coasters",
            "generate",
            "--seed",
            "7",
            "--rollover-hour",
            "4",
            "--day",
            "2025-03-01",
        ]);
        assert_eq!(cli.command(), Command::Generate { seed: Some(7) });
        assert_eq!(cli.rollover_hour, Some(4));
        assert_eq!(cli.day, NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn test_bad_day_is_rejected() {
        let result = Cli::try_parse_from(["coasters", "share", "--day", "tomorrow"]);
        assert!(result.is_err());
    }
}
