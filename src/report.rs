//! Plain-text renderings of the daily check-in and the status overview.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::NaiveDate;

use crate::clock::Today;
use crate::goal::{GoalConfig, Progression};
use crate::log::{LogEntry, format_amount};
use crate::progression::Position;
use crate::todo::PendingTask;
use crate::urgency::{Priority, TodoItem};

/// Pending tasks listed per goal before summarising.
const TASKS_PER_GOAL: usize = 3;

/// Recent entries shown per goal in the status view.
const RECENT_ENTRIES: usize = 3;

/// Render the daily check-in.
pub fn render_check_in(today: &Today, todos: &[TodoItem], pending: &[PendingTask]) -> String {
    if todos.is_empty() && pending.is_empty() {
        return "All caught up! No urgent items.\n".into();
    }

    let mut out = format!("Goals check-in ({})\n\n", today.date());
    for (priority, title) in [
        (Priority::Overdue, "Needs attention:"),
        (Priority::Due, "Coming up:"),
        (Priority::Info, "Progress:"),
    ] {
        let lines: Vec<_> = todos.iter().filter(|t| t.priority == priority).collect();
        if lines.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{title}");
        for todo in lines {
            let _ = writeln!(out, "- {}", todo.message);
        }
        out.push('\n');
    }

    if !pending.is_empty() {
        let _ = writeln!(out, "Pending tasks:");
        for group in pending.chunk_by(|a, b| a.goal_id == b.goal_id) {
            for p in group.iter().take(TASKS_PER_GOAL) {
                let _ = writeln!(out, "- {}/{}: {}", p.goal_id, p.unit, p.task.label());
            }
            if group.len() > TASKS_PER_GOAL {
                let _ = writeln!(out, "  (+{} more)", group.len() - TASKS_PER_GOAL);
            }
        }
    }
    out
}

/// Reporting window of the status view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPeriod {
    Today,
    #[default]
    Week,
    Month,
    All,
}

impl StatusPeriod {
    /// First date included, or `None` for all time.
    pub fn since(&self, today: &Today) -> Option<NaiveDate> {
        match self {
            Self::Today => Some(today.date()),
            Self::Week => Some(today.week_start()),
            Self::Month => Some(today.month_start()),
            Self::All => None,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::All => "all",
        }
    }
}

impl fmt::Display for StatusPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl FromStr for StatusPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "all" => Ok(Self::All),
            other => Err(format!(
                "unknown period \"{other}\" (expected today, week, month or all)"
            )),
        }
    }
}

/// One goal's inputs to the status view.
#[derive(Debug, Clone)]
pub struct GoalStatus {
    pub goal: GoalConfig,
    pub position: Position,
    /// All entries, sorted by date.
    pub logs: Vec<LogEntry>,
}

impl GoalStatus {
    fn position_line(&self) -> Option<String> {
        let Position {
            current,
            done,
            total,
            week,
        } = &self.position;
        match (self.goal.progression, current) {
            (Progression::Sequential, Some(c)) => {
                Some(format!("Current: {c} ({done}/{total} complete)"))
            }
            (Progression::Sequential, None) if *total > 0 => {
                Some(format!("All complete! ({done}/{total})"))
            }
            (Progression::TimeWeekly, Some(c)) => {
                Some(format!("Week {}: {c}", week.unwrap_or(1)))
            }
            (Progression::TimeWeekly, None) => Some(format!("Week {}", week.unwrap_or(1))),
            (Progression::Unordered, _) => Some(format!("Progress: {done}/{total} done")),
            _ => None,
        }
    }
}

/// Render the status overview of `goals` for `period`.
pub fn render_status(goals: &[GoalStatus], period: StatusPeriod, today: &Today) -> String {
    let since = period.since(today);
    let mut out = format!("Status ({period})\n\n");

    for status in goals {
        let period_logs: Vec<&LogEntry> = status
            .logs
            .iter()
            .filter(|e| since.is_none_or(|s| e.date >= s))
            .collect();

        let _ = writeln!(out, "{}", status.goal.display_name());
        if let Some(line) = status.position_line() {
            let _ = writeln!(out, "  {line}");
        }

        match status.goal.unit.as_deref() {
            Some(unit) => {
                let total: f64 = period_logs.iter().filter_map(|e| e.numeric()).sum();
                let _ = writeln!(out, "  This {period}: {} {unit}", format_amount(total));
            }
            None => {
                let done = period_logs.iter().filter(|e| e.is_done()).count();
                if done > 0 {
                    let _ = writeln!(out, "  This {period}: {done} entries");
                }
            }
        }

        if !period_logs.is_empty() {
            let _ = writeln!(out, "  Recent:");
            let skip = period_logs.len().saturating_sub(RECENT_ENTRIES);
            for entry in &period_logs[skip..] {
                let _ = writeln!(out, "    - {}", describe_entry(entry));
            }
        }
        out.push('\n');
    }
    out
}

fn describe_entry(entry: &LogEntry) -> String {
    let mut line = entry.date.to_string();
    if let Some(path) = &entry.path {
        let _ = write!(line, " [{path}]");
    }
    if let Some(value) = &entry.value {
        let _ = write!(line, ": {value}");
    }
    if let Some(notes) = &entry.notes {
        let _ = write!(line, " ({notes})");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::TodoTask;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn todo(message: &str, priority: Priority) -> TodoItem {
        TodoItem {
            goal: "g".into(),
            name: "G".into(),
            message: message.into(),
            priority,
        }
    }

    fn pending(goal: &str, unit: &str, id: &str) -> PendingTask {
        PendingTask {
            goal_id: goal.into(),
            unit: unit.into(),
            task: TodoTask::new(id, id.to_uppercase()),
        }
    }

    #[test]
    fn all_caught_up_when_nothing_to_show() {
        let out = render_check_in(&Today::on(date(1, 9)), &[], &[]);
        assert_eq!(out, "All caught up! No urgent items.\n");
    }

    #[test]
    fn check_in_sections_in_priority_order() {
        let todos = vec![
            todo("Hindi: 8 days since last session", Priority::Overdue),
            todo("Fitness: 60/150 min", Priority::Due),
            todo("Reading: 3/10 done", Priority::Info),
        ];
        let out = render_check_in(&Today::on(date(1, 9)), &todos, &[]);
        let attention = out.find("Needs attention:").unwrap();
        let coming = out.find("Coming up:").unwrap();
        let progress = out.find("Progress:").unwrap();
        assert!(attention < coming && coming < progress);
        assert!(out.starts_with("Goals check-in (2026-01-09)"));
        assert!(out.contains("- Fitness: 60/150 min\n"));
        assert!(!out.contains("Pending tasks:"));
    }

    #[test]
    fn pending_tasks_capped_per_goal() {
        let tasks = vec![
            pending("calendar", "week-2", "a"),
            pending("calendar", "week-2", "b"),
            pending("calendar", "week-3", "c"),
            pending("calendar", "week-3", "d"),
            pending("calendar", "week-3", "e"),
            pending("hindi", "ch1", "read"),
        ];
        let out = render_check_in(&Today::on(date(1, 9)), &[], &tasks);
        assert!(out.contains("- calendar/week-3: C\n  (+2 more)\n"));
        assert!(!out.contains("calendar/week-3: D"));
        assert!(out.contains("- hindi/ch1: READ\n"));
    }

    #[test]
    fn period_parsing() {
        assert_eq!("Month".parse::<StatusPeriod>(), Ok(StatusPeriod::Month));
        assert!("year".parse::<StatusPeriod>().is_err());
        let today = Today::on(date(1, 9));
        assert_eq!(StatusPeriod::Week.since(&today), Some(date(1, 5)));
        assert_eq!(StatusPeriod::Month.since(&today), Some(date(1, 1)));
        assert_eq!(StatusPeriod::All.since(&today), None);
    }

    #[test]
    fn status_sums_units_and_lists_recent() {
        let mut goal = GoalConfig::new("fitness");
        goal.name = "Fitness".into();
        goal.unit = Some("min".into());
        let logs = vec![
            LogEntry::amount(date(1, 2), 99.0),
            LogEntry::amount(date(1, 5), 30.0),
            LogEntry::amount(date(1, 6), 20.0),
            LogEntry::amount(date(1, 7), 15.5),
            LogEntry {
                notes: Some("easy".into()),
                ..LogEntry::amount(date(1, 8), 10.0)
            },
        ];
        let status = GoalStatus {
            goal,
            position: Position::empty(),
            logs,
        };
        let out = render_status(&[status], StatusPeriod::Week, &Today::on(date(1, 9)));
        assert!(out.contains("Fitness\n"));
        assert!(out.contains("  This week: 75.5 min\n"));
        assert!(!out.contains("2026-01-05: 30"));
        assert!(out.contains("    - 2026-01-08: 10 (easy)\n"));
    }

    #[test]
    fn status_progression_lines() {
        let mut goal = GoalConfig::new("hindi");
        goal.progression = Progression::Sequential;
        let status = GoalStatus {
            goal,
            position: Position {
                current: Some("ch2".into()),
                done: 1,
                total: 3,
                week: None,
            },
            logs: vec![LogEntry::completed(date(1, 9), "ch1")],
        };
        let out = render_status(&[status], StatusPeriod::Today, &Today::on(date(1, 9)));
        assert!(out.contains("  Current: ch2 (1/3 complete)\n"));
        assert!(out.contains("  This today: 1 entries\n"));
        assert!(out.contains("    - 2026-01-09 [ch1]\n"));
    }
}
