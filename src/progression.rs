//! Progression resolver: where a goal currently stands within its content.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;

use crate::clock::Today;
use crate::content;
use crate::goal::{GoalConfig, Progression};
use crate::log::LogEntry;

/// A goal's position within its discovered content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    /// The item to work on next, if the model defines one.
    pub current: Option<String>,
    pub done: usize,
    pub total: usize,
    /// Weeks since `start`, for time-weekly goals.
    pub week: Option<u32>,
}

impl Position {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Top-level items marked done by any log entry.
pub fn completed_items(logs: &[LogEntry]) -> HashSet<&str> {
    logs.iter()
        .filter(|e| e.is_done())
        .filter_map(LogEntry::top_item)
        .collect()
}

/// 1-based week count since `start`: `floor(days / 7) + 1`, never below 1.
pub fn week_number(start: NaiveDate, today: &Today) -> u32 {
    let weeks = today.days_since(start).div_euclid(7) + 1;
    u32::try_from(weeks.max(1)).unwrap_or(1)
}

/// Resolve against already-discovered `items` (sorted).
pub fn resolve_with_items(
    goal: &GoalConfig,
    items: &[String],
    logs: &[LogEntry],
    today: &Today,
) -> Position {
    if goal.content.is_none() {
        return Position::empty();
    }

    let completed = completed_items(logs);
    let total = items.len();
    let done = items
        .iter()
        .filter(|i| completed.contains(i.as_str()))
        .count();

    match goal.progression {
        Progression::Sequential => Position {
            current: items
                .iter()
                .find(|i| !completed.contains(i.as_str()))
                .cloned(),
            done,
            total,
            week: None,
        },
        Progression::TimeWeekly => {
            let week = goal.start.map(|s| week_number(s, today)).unwrap_or(1);
            let marker = format!("week-{week}");
            let literal = week.to_string();
            let current = items
                .iter()
                .find(|i| i.to_lowercase().contains(&marker) || **i == literal)
                .cloned();
            Position {
                current,
                done,
                total,
                week: Some(week),
            }
        }
        Progression::Unordered => Position {
            current: None,
            done,
            total,
            week: None,
        },
        Progression::None => Position::empty(),
    }
}

/// Discover the goal's content under `repo_root` and resolve its position.
pub fn resolve(goal: &GoalConfig, repo_root: &Path, logs: &[LogEntry], today: &Today) -> Position {
    let Some(content_path) = goal.content.as_deref() else {
        return Position::empty();
    };
    let items = content::discover(&repo_root.join(content_path));
    resolve_with_items(goal, &items, logs, today)
}
