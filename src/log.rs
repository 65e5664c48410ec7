//! Logged events per goal.
//!
//! A goal's log file is a list of records. Older records are flat entries
//! (`{date, path, value, notes, done}`); newer ones group a day's entries
//! under `{date, entries: [...], total}`. The core only ever sees the
//! flattened, chronological `LogEntry` view.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The logged quantity: an amount or a completion flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogValue {
    Numeric(f64),
    Completion(bool),
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => f.write_str(&format_amount(*n)),
            Self::Completion(b) => write!(f, "{b}"),
        }
    }
}

/// Render an amount without a trailing `.0` for whole numbers.
pub fn format_amount(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n:.2}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// One logged event, as consumed by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    /// Subgoal identifier, segments separated by `/` or `.`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<LogValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl LogEntry {
    /// A completion entry for `path`.
    pub fn completed(date: NaiveDate, path: impl Into<String>) -> Self {
        Self {
            date,
            path: Some(path.into()),
            value: None,
            notes: None,
            done: Some(true),
        }
    }

    /// A numeric entry.
    pub fn amount(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            path: None,
            value: Some(LogValue::Numeric(value)),
            notes: None,
            done: None,
        }
    }

    /// Build an entry the way the `log` command does: a boolean value is a
    /// completion flag, no value at all means "done".
    pub fn from_input(
        date: NaiveDate,
        path: Option<String>,
        value: Option<LogValue>,
        notes: Option<String>,
    ) -> Self {
        let (value, done) = match value {
            Some(LogValue::Completion(b)) => (None, Some(b)),
            Some(v @ LogValue::Numeric(_)) => (Some(v), None),
            None => (None, Some(true)),
        };
        Self {
            date,
            path,
            value,
            notes,
            done,
        }
    }

    /// Whether this entry marks its path as completed.
    pub fn is_done(&self) -> bool {
        match (self.done, self.value) {
            (Some(done), _) => done,
            (None, Some(LogValue::Completion(b))) => b,
            (None, Some(LogValue::Numeric(_))) => false,
            (None, None) => true,
        }
    }

    pub fn numeric(&self) -> Option<f64> {
        match self.value {
            Some(LogValue::Numeric(n)) => Some(n),
            _ => None,
        }
    }

    /// First segment of `path`, the top-level content item it refers to.
    pub fn top_item(&self) -> Option<&str> {
        let path = self.path.as_deref()?;
        let top = path.split(['/', '.']).next()?.trim();
        (!top.is_empty()).then_some(top)
    }

    fn matches(&self, date: NaiveDate, path: Option<&str>) -> bool {
        self.date == date && path.is_none_or(|p| self.path.as_deref() == Some(p))
    }
}

/// An entry nested under a day record; it inherits the parent's date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<LogValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl DayItem {
    fn to_entry(&self, date: NaiveDate) -> LogEntry {
        LogEntry {
            date,
            path: self.path.clone(),
            value: self.value,
            notes: self.notes.clone(),
            done: self.done,
        }
    }

    fn from_entry(entry: LogEntry) -> Self {
        Self {
            path: entry.path,
            value: entry.value,
            notes: entry.notes,
            done: entry.done,
        }
    }
}

/// All of one day's entries plus their numeric running total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub entries: Vec<DayItem>,
    #[serde(default)]
    pub total: f64,
}

impl DayRecord {
    pub fn recompute_total(&mut self) {
        self.total = self
            .entries
            .iter()
            .filter_map(|e| match e.value {
                Some(LogValue::Numeric(n)) => Some(n),
                _ => None,
            })
            .sum();
    }
}

/// One stored record. Unrecognised shapes are kept verbatim so a rewrite
/// never drops data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogRecord {
    Day(DayRecord),
    Entry(LogEntry),
    Unknown(serde_yaml::Value),
}

/// Changes applied by `edit`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    /// A completion value sets `done`; a numeric one sets `value`.
    pub value: Option<LogValue>,
    pub notes: Option<String>,
}

impl EntryPatch {
    fn apply(
        &self,
        done: &mut Option<bool>,
        value: &mut Option<LogValue>,
        notes: &mut Option<String>,
    ) {
        match self.value {
            Some(LogValue::Completion(b)) => *done = Some(b),
            Some(v @ LogValue::Numeric(_)) => *value = Some(v),
            None => {}
        }
        if let Some(n) = &self.notes {
            *notes = Some(n.clone());
        }
    }
}

/// A goal's full log file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogBook {
    records: Vec<LogRecord>,
}

impl LogBook {
    pub fn new(records: Vec<LogRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Entries in file order, nested ones expanded in place.
    pub fn entries(&self) -> Vec<LogEntry> {
        let mut out = Vec::new();
        for record in &self.records {
            match record {
                LogRecord::Entry(e) => out.push(e.clone()),
                LogRecord::Day(day) => {
                    out.extend(day.entries.iter().map(|item| item.to_entry(day.date)))
                }
                LogRecord::Unknown(value) => {
                    tracing::warn!(record = ?value, "ignoring unrecognized log record");
                }
            }
        }
        out
    }

    /// Append `entry`, nesting it under an existing day record for its date.
    pub fn append(&mut self, entry: LogEntry) {
        let date = entry.date;
        let day = self.records.iter_mut().find_map(|r| match r {
            LogRecord::Day(day) if day.date == date => Some(day),
            _ => None,
        });
        match day {
            Some(day) => {
                day.entries.push(DayItem::from_entry(entry));
                day.recompute_total();
            }
            None => self.records.push(LogRecord::Entry(entry)),
        }
    }

    /// Patch the first entry on `date` (matching `path` when given).
    pub fn edit(
        &mut self,
        date: NaiveDate,
        path: Option<&str>,
        patch: &EntryPatch,
    ) -> Option<LogEntry> {
        let (idx, nested) = self.locate(date, path)?;
        match (&mut self.records[idx], nested) {
            (LogRecord::Day(day), Some(pos)) => {
                let item = &mut day.entries[pos];
                patch.apply(&mut item.done, &mut item.value, &mut item.notes);
                let updated = item.to_entry(date);
                day.recompute_total();
                Some(updated)
            }
            (LogRecord::Entry(e), None) => {
                patch.apply(&mut e.done, &mut e.value, &mut e.notes);
                Some(e.clone())
            }
            _ => None,
        }
    }

    /// Remove the first entry on `date` (matching `path` when given).
    /// A day record left empty is removed too.
    pub fn delete(&mut self, date: NaiveDate, path: Option<&str>) -> Option<LogEntry> {
        let (idx, nested) = self.locate(date, path)?;
        let Some(pos) = nested else {
            return match self.records.remove(idx) {
                LogRecord::Entry(removed) => Some(removed),
                _ => None,
            };
        };

        let LogRecord::Day(day) = &mut self.records[idx] else {
            return None;
        };
        let removed = day.entries.remove(pos).to_entry(date);
        day.recompute_total();
        if day.entries.is_empty() {
            self.records.remove(idx);
        }
        Some(removed)
    }

    /// Position of the first entry matching `date`/`path`: the record index
    /// and, for day records, the index inside it.
    fn locate(&self, date: NaiveDate, path: Option<&str>) -> Option<(usize, Option<usize>)> {
        self.records
            .iter()
            .enumerate()
            .find_map(|(idx, record)| match record {
                LogRecord::Entry(e) if e.matches(date, path) => Some((idx, None)),
                LogRecord::Day(day) if day.date == date => day
                    .entries
                    .iter()
                    .position(|i| path.is_none_or(|p| i.path.as_deref() == Some(p)))
                    .map(|pos| (idx, Some(pos))),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    const MIXED: &str = r#"
- date: 2026-01-05
  path: ch1
  done: true
- date: 2026-01-06
  entries:
    - path: run
      value: 30
    - path: lift
      value: 20
      notes: legs
  total: 50
- date: 2026-01-07
  value: true
"#;

    #[test]
    fn flattens_nested_records_in_order() {
        let book: LogBook = serde_yaml::from_str(MIXED).unwrap();
        let entries = book.entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].top_item(), Some("ch1"));
        assert_eq!(entries[1].date, date(6));
        assert_eq!(entries[2].notes.as_deref(), Some("legs"));
        assert_eq!(entries[2].numeric(), Some(20.0));
        assert!(entries[3].is_done());
    }

    #[test]
    fn is_done_derivation() {
        let mut e = LogEntry::amount(date(1), 10.0);
        assert!(!e.is_done());
        e.value = None;
        assert!(e.is_done());
        e.value = Some(LogValue::Completion(false));
        assert!(!e.is_done());
        e.done = Some(true);
        assert!(e.is_done());
    }

    #[test]
    fn from_input_maps_boolean_to_done() {
        let e = LogEntry::from_input(date(1), None, Some(LogValue::Completion(false)), None);
        assert_eq!(e.done, Some(false));
        assert_eq!(e.value, None);
        let e = LogEntry::from_input(date(1), Some("ch1".into()), None, None);
        assert_eq!(e.done, Some(true));
    }

    #[test]
    fn top_item_splits_on_slash_and_dot() {
        let mut e = LogEntry::completed(date(1), "ch2/exercises");
        assert_eq!(e.top_item(), Some("ch2"));
        e.path = Some("ch3.vocab".into());
        assert_eq!(e.top_item(), Some("ch3"));
        e.path = None;
        assert_eq!(e.top_item(), None);
    }

    #[test]
    fn append_nests_under_existing_day_and_updates_total() {
        let mut book: LogBook = serde_yaml::from_str(MIXED).unwrap();
        book.append(LogEntry::amount(date(6), 15.0));
        let LogRecord::Day(day) = &book.records()[1] else {
            panic!("expected day record");
        };
        assert_eq!(day.entries.len(), 3);
        assert_eq!(day.total, 65.0);

        book.append(LogEntry::amount(date(8), 5.0));
        assert_eq!(book.records().len(), 4);
    }

    #[test]
    fn edit_recomputes_total() {
        let mut book: LogBook = serde_yaml::from_str(MIXED).unwrap();
        let patch = EntryPatch {
            value: Some(LogValue::Numeric(40.0)),
            notes: None,
        };
        let updated = book.edit(date(6), Some("run"), &patch).unwrap();
        assert_eq!(updated.numeric(), Some(40.0));
        let LogRecord::Day(day) = &book.records()[1] else {
            panic!("expected day record");
        };
        assert_eq!(day.total, 60.0);

        assert!(book.edit(date(9), None, &patch).is_none());
    }

    #[test]
    fn delete_removes_emptied_day_record() {
        let mut book: LogBook = serde_yaml::from_str(MIXED).unwrap();
        book.delete(date(6), Some("run")).unwrap();
        let LogRecord::Day(day) = &book.records()[1] else {
            panic!("expected day record");
        };
        assert_eq!(day.total, 20.0);

        book.delete(date(6), None).unwrap();
        assert_eq!(book.records().len(), 2);
        assert!(book.delete(date(6), None).is_none());
    }

    #[test]
    fn unknown_records_survive_round_trip() {
        let text = "- just a string\n- date: 2026-01-05\n  done: true\n";
        let book: LogBook = serde_yaml::from_str(text).unwrap();
        assert_eq!(book.entries().len(), 1);
        assert!(matches!(book.records()[0], LogRecord::Unknown(_)));
        let out = serde_yaml::to_string(&book).unwrap();
        assert!(out.contains("just a string"));
    }

    #[test]
    fn format_amount_drops_trailing_zero() {
        assert_eq!(format_amount(60.0), "60");
        assert_eq!(format_amount(12.5), "12.5");
    }
}
