//! Active-day resolution
//!
//! Both the daily puzzle key and the validity of a stored session hinge on which
//! calendar day is "active". Before the rollover hour the previous day's puzzle is
//! still in play, so everything that needs a day asks [`DaySchedule`] for it.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Local hour at which the next day's puzzle becomes active
pub const DEFAULT_ROLLOVER_HOUR: u32 = 6;

/// Resolve the active day for a local timestamp
pub fn active_day(now: NaiveDateTime, rollover_hour: u32) -> NaiveDate {
    let today = now.date();
    if now.hour() < rollover_hour {
        today.pred_opt().unwrap_or(today)
    } else {
        today
    }
}

/// Storage key for a day, `YYYY-MM-DD`
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Parse a storage key back into a date
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Day boundaries and puzzle numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub rollover_hour: u32,
    /// Day that carries puzzle #1
    pub launch_date: NaiveDate,
}

impl Default for DaySchedule {
    fn default() -> Self {
        Self {
            rollover_hour: DEFAULT_ROLLOVER_HOUR,
            launch_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
        }
    }
}

impl DaySchedule {
    pub fn new(rollover_hour: u32, launch_date: NaiveDate) -> Self {
        Self {
            rollover_hour: rollover_hour.min(23),
            launch_date,
        }
    }

    /// Active day at a given local time
    pub fn active_day(&self, now: NaiveDateTime) -> NaiveDate {
        active_day(now, self.rollover_hour)
    }

    /// Active day right now, on the local clock
    pub fn today(&self) -> NaiveDate {
        self.active_day(Local::now().naive_local())
    }

    /// Sequence number of the puzzle for `day`; days before launch clamp to 1
    pub fn number_for(&self, day: NaiveDate) -> u32 {
        let offset = (day - self.launch_date).num_days().max(0);
        u32::try_from(offset + 1).unwrap_or(u32::MAX)
    }

    /// The day after `day`
    pub fn next_day(day: NaiveDate) -> NaiveDate {
        day + Duration::days(1)
    }
}
