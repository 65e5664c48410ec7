//! The "today" instant shared by one evaluation pass.
//!
//! Every classifier takes a `&Today` instead of reading the wall clock, so a
//! whole check-in is evaluated against the same instant.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};

/// Three-letter day labels indexed by `weekday_index()`.
pub const DAY_LABELS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// A point in local time, captured once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Today {
    now: NaiveDateTime,
}

impl Today {
    /// Read the local wall clock.
    pub fn now() -> Self {
        Self {
            now: Local::now().naive_local(),
        }
    }

    /// A fixed instant.
    pub fn at(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Midnight on `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            now: date.and_time(NaiveTime::MIN),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.now.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.now.time()
    }

    /// 0 = Monday, 6 = Sunday.
    pub fn weekday_index(&self) -> u32 {
        self.now.weekday().num_days_from_monday()
    }

    /// Three-letter label of today's weekday (`mon`..`sun`).
    pub fn day_label(&self) -> &'static str {
        DAY_LABELS[self.weekday_index() as usize]
    }

    /// Monday of the current week.
    pub fn week_start(&self) -> NaiveDate {
        self.date() - Duration::days(i64::from(self.weekday_index()))
    }

    /// First day of the current month.
    pub fn month_start(&self) -> NaiveDate {
        self.date().with_day(1).unwrap_or(self.date())
    }

    /// Whole days from `date` to today; negative when `date` is in the future.
    pub fn days_since(&self, date: NaiveDate) -> i64 {
        (self.date() - date).num_days()
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse an `HH:MM` time of day.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

/// Serde helper for optional ISO dates that tolerates malformed input by
/// warning and yielding `None`.
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_yaml::Value::deserialize(deserializer)?;
    let parsed = match &raw {
        serde_yaml::Value::Null => return Ok(None),
        serde_yaml::Value::String(s) => parse_date(s),
        _ => None,
    };
    if parsed.is_none() {
        tracing::warn!(value = ?raw, "ignoring malformed date");
    }
    Ok(parsed)
}
