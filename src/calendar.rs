//! The calendar collaborator (§6). The engine requires only day-resolution
//! arithmetic; implementations must use a single caller-provided calendar
//! throughout a call so results stay deterministic across time zones.

use chrono::{Duration, NaiveDate};

/// Minimal calendar interface the engine depends on.
pub trait Calendar {
    /// Start of the calendar day containing `date`. For day-resolution
    /// dates this is the identity.
    fn start_of_day(&self, date: NaiveDate) -> NaiveDate;

    /// `date` plus `days` calendar days (may be negative).
    fn add_days(&self, date: NaiveDate, days: i64) -> NaiveDate;

    /// Whole calendar days from `from` to `to` (negative if `to` precedes `from`).
    fn days_between(&self, from: NaiveDate, to: NaiveDate) -> i64;
}

/// The default Gregorian calendar used by the CLI and by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct GregorianCalendar;

impl Calendar for GregorianCalendar {
    fn start_of_day(&self, date: NaiveDate) -> NaiveDate {
        date
    }

    fn add_days(&self, date: NaiveDate, days: i64) -> NaiveDate {
        date + Duration::days(days)
    }

    fn days_between(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        to.signed_duration_since(from).num_days()
    }
}
