//! Urgency classifier: today's attention tier for one goal.
//!
//! A goal's policy comes from its explicit `urgency:` block or is inferred
//! from cadence and progression:
//!
//! | Cadence / progression          | Policy                          |
//! |--------------------------------|---------------------------------|
//! | daily                          | daily (nag 07:00, due 23:59)    |
//! | weekly with a target           | target (weekly, warn at 0.5)    |
//! | weekly                         | weekly                          |
//! | every_2_weeks                  | biweekly                        |
//! | no cadence, sequential         | stale (5 / 7 days)              |
//! | anything else                  | none                            |

use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::clock::{Today, parse_time};
use crate::goal::{Cadence, GoalConfig, PolicyKind, Progression, TargetPeriod, UrgencySpec};
use crate::log::{LogEntry, format_amount};
use crate::progression::{self, Position};
use crate::schedule::EffectiveWeek;
use crate::todo::{TodoLookup, join_labels};

pub const DEFAULT_DUE_BY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 0) {
    Some(t) => t,
    None => NaiveTime::MIN,
};
pub const DEFAULT_NAG_FROM: NaiveTime = match NaiveTime::from_hms_opt(7, 0, 0) {
    Some(t) => t,
    None => NaiveTime::MIN,
};
pub const DEFAULT_WARN_AT: f64 = 0.5;
pub const DEFAULT_STALE_DAYS: i64 = 5;
pub const DEFAULT_OVERDUE_DAYS: i64 = 7;

/// Days without a log before a biweekly goal is due / overdue.
const BIWEEKLY_DUE_DAYS: i64 = 12;
const BIWEEKLY_OVERDUE_DAYS: i64 = 14;

/// Weekday index (0 = Monday) from which an idle week counts as overdue.
const LATE_WEEK: u32 = 3;

/// How many task names a message lists before summarising.
const TASK_PREVIEW: usize = 2;

// ═══════════════════════════════════════════════════════════════════════
// Priority
// ═══════════════════════════════════════════════════════════════════════

/// Attention tier of a todo line. Ordered most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Overdue,
    Due,
    Info,
}

impl Priority {
    /// Sort rank: overdue 0, due 1, info 2.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Overdue => 0,
            Self::Due => 1,
            Self::Info => 2,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Due => "due",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One line of the daily check-in.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoItem {
    pub goal: String,
    pub name: String,
    pub message: String,
    pub priority: Priority,
}

// ═══════════════════════════════════════════════════════════════════════
// Policy
// ═══════════════════════════════════════════════════════════════════════

/// Parameters of a target policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPolicy {
    pub target: f64,
    pub period: TargetPeriod,
    /// Fraction of the target that separates the tiers.
    pub warn_at: f64,
    /// Spending caps and the like: staying under the target is the goal.
    pub under_is_good: bool,
}

/// The resolved urgency policy of a goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UrgencyPolicy {
    Daily {
        due_by: NaiveTime,
        nag_from: NaiveTime,
    },
    Weekly,
    Biweekly,
    Target(TargetPolicy),
    Stale {
        stale_days: i64,
        overdue_days: i64,
    },
    None,
}

impl UrgencyPolicy {
    /// Resolve the policy for `goal`: an explicit `type` wins, otherwise it
    /// is inferred from cadence and progression.
    pub fn for_goal(goal: &GoalConfig) -> Self {
        let spec = goal.urgency.clone().unwrap_or_default();
        match spec.kind {
            Some(PolicyKind::None) => Self::None,
            Some(PolicyKind::Daily) => Self::daily(&spec),
            Some(PolicyKind::Weekly) => Self::Weekly,
            Some(PolicyKind::Biweekly) => Self::Biweekly,
            Some(PolicyKind::Target) => Self::target(goal, &spec),
            Some(PolicyKind::Stale) => Self::stale(&spec),
            Some(PolicyKind::Unrecognized) | None => Self::infer(goal, &spec),
        }
    }

    fn infer(goal: &GoalConfig, spec: &UrgencySpec) -> Self {
        let has_target = spec.target.is_some() || goal.target.is_some();
        match (goal.cadence, goal.progression) {
            (Cadence::Daily, _) => Self::daily(spec),
            (Cadence::Weekly, _) if has_target => Self::target(goal, spec),
            (Cadence::Weekly, _) => Self::Weekly,
            (Cadence::EveryTwoWeeks, _) => Self::Biweekly,
            (Cadence::None, Progression::Sequential) => Self::stale(spec),
            (Cadence::None, Progression::Unordered) => Self::None,
            (Cadence::None, Progression::TimeWeekly | Progression::None) => Self::None,
        }
    }

    fn daily(spec: &UrgencySpec) -> Self {
        Self::Daily {
            due_by: time_or(spec.due_by.as_deref(), DEFAULT_DUE_BY),
            nag_from: time_or(spec.nag_from.as_deref(), DEFAULT_NAG_FROM),
        }
    }

    fn target(goal: &GoalConfig, spec: &UrgencySpec) -> Self {
        Self::Target(TargetPolicy {
            target: spec.target.or(goal.target).unwrap_or(0.0),
            period: spec.period.unwrap_or_default(),
            warn_at: spec.warn_at.unwrap_or(DEFAULT_WARN_AT),
            under_is_good: spec.under_is_good.unwrap_or(false),
        })
    }

    fn stale(spec: &UrgencySpec) -> Self {
        Self::Stale {
            stale_days: spec.stale_days.unwrap_or(DEFAULT_STALE_DAYS),
            overdue_days: spec.overdue_days.unwrap_or(DEFAULT_OVERDUE_DAYS),
        }
    }
}

fn time_or(raw: Option<&str>, default: NaiveTime) -> NaiveTime {
    match raw {
        None => default,
        Some(s) => parse_time(s).unwrap_or_else(|| {
            tracing::warn!(value = %s, "malformed time of day, using default");
            default
        }),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Classification
// ═══════════════════════════════════════════════════════════════════════

/// Everything the classifier needs to know about one goal.
pub struct GoalInputs<'a> {
    pub goal: &'a GoalConfig,
    /// Chronological log entries.
    pub logs: &'a [LogEntry],
    pub week: &'a EffectiveWeek,
    /// Discovered content items, sorted.
    pub items: &'a [String],
    /// Schedule override of the target for the effective week.
    pub weekly_target: Option<f64>,
    pub todos: &'a dyn TodoLookup,
}

impl GoalInputs<'_> {
    fn position(&self, today: &Today) -> Position {
        progression::resolve_with_items(self.goal, self.items, self.logs, today)
    }

    fn last_log_date(&self) -> Option<NaiveDate> {
        self.logs.iter().map(|e| e.date).max()
    }

    fn logs_since(&self, since: NaiveDate) -> impl Iterator<Item = &LogEntry> {
        self.logs.iter().filter(move |e| e.date >= since)
    }

    fn item(&self, message: String, priority: Priority) -> TodoItem {
        TodoItem {
            goal: self.goal.id.clone(),
            name: self.goal.display_name().to_string(),
            message: format!("{}: {message}", self.goal.display_name()),
            priority,
        }
    }
}

/// Classify one goal for `today`. `None` means the goal needs no line.
pub fn classify(inputs: &GoalInputs<'_>, today: &Today) -> Option<TodoItem> {
    let policy = UrgencyPolicy::for_goal(inputs.goal);

    if inputs.week.paused && policy != UrgencyPolicy::None {
        let until = inputs
            .week
            .paused_until
            .map(|d| format!(" until {d}"))
            .unwrap_or_default();
        let reason = inputs
            .week
            .reason
            .as_deref()
            .map(|r| format!(" ({r})"))
            .unwrap_or_default();
        return Some(inputs.item(format!("paused{until}{reason}"), Priority::Info));
    }

    match policy {
        UrgencyPolicy::Daily { due_by, nag_from } => {
            if inputs.goal.progression == Progression::TimeWeekly {
                classify_week_tasks(inputs, today)
            } else {
                classify_daily(inputs, today, due_by, nag_from)
            }
        }
        UrgencyPolicy::Weekly => Some(classify_weekly(inputs, today)),
        UrgencyPolicy::Biweekly => classify_biweekly(inputs, today),
        UrgencyPolicy::Target(target) => Some(classify_target(inputs, today, &target)),
        UrgencyPolicy::Stale {
            stale_days,
            overdue_days,
        } => classify_stale(inputs, today, stale_days, overdue_days),
        UrgencyPolicy::None => classify_none(inputs, today),
    }
}

fn classify_daily(
    inputs: &GoalInputs<'_>,
    today: &Today,
    due_by: NaiveTime,
    nag_from: NaiveTime,
) -> Option<TodoItem> {
    if inputs.logs.iter().any(|e| e.date == today.date()) {
        return None;
    }
    let now = today.time();
    if now > due_by {
        Some(inputs.item(
            format!("overdue (due by {})", due_by.format("%H:%M")),
            Priority::Overdue,
        ))
    } else if now >= nag_from {
        Some(inputs.item("not done today".into(), Priority::Due))
    } else {
        None
    }
}

/// Daily goal on a weekly calendar: judged by today's tasks in `week-N`.
fn classify_week_tasks(inputs: &GoalInputs<'_>, today: &Today) -> Option<TodoItem> {
    let week = inputs.week.number;
    let todo = inputs.todos.unit_todo(&inputs.goal.id, &inputs.week.unit());
    let todays: Vec<_> = todo.for_day(today.day_label()).collect();

    if !todays.is_empty() {
        let pending: Vec<_> = todays.iter().copied().filter(|t| !t.done).collect();
        return if pending.is_empty() {
            Some(inputs.item("today's tasks done ✓".into(), Priority::Info))
        } else {
            Some(inputs.item(join_labels(pending, TASK_PREVIEW), Priority::Due))
        };
    }

    let pending = todo.pending().count();
    (pending > 0).then(|| {
        inputs.item(
            format!("week {week} - {pending} tasks pending"),
            Priority::Info,
        )
    })
}

fn classify_weekly(inputs: &GoalInputs<'_>, today: &Today) -> TodoItem {
    let week_logs: Vec<_> = inputs.logs_since(today.week_start()).collect();
    if week_logs.is_empty() {
        return if today.weekday_index() >= LATE_WEEK {
            inputs.item("nothing logged this week".into(), Priority::Overdue)
        } else {
            inputs.item("week started, nothing logged".into(), Priority::Due)
        };
    }
    let total: f64 = week_logs.iter().filter_map(|e| e.numeric()).sum();
    inputs.item(
        format!(
            "{} {} this week",
            format_amount(total),
            inputs.goal.unit_label()
        )
        .trim_end()
        .to_string(),
        Priority::Info,
    )
}

fn classify_biweekly(inputs: &GoalInputs<'_>, today: &Today) -> Option<TodoItem> {
    if let Some(last) = inputs.last_log_date() {
        let days = today.days_since(last);
        let item = if days >= BIWEEKLY_OVERDUE_DAYS {
            inputs.item(format!("{days} days since last (overdue)"), Priority::Overdue)
        } else if days >= BIWEEKLY_DUE_DAYS {
            inputs.item(format!("{days} days since last"), Priority::Due)
        } else {
            inputs.item(format!("{days} days since last"), Priority::Info)
        };
        return Some(item);
    }

    match inputs.goal.start {
        Some(start) => {
            let days = today.days_since(start);
            if days >= BIWEEKLY_OVERDUE_DAYS {
                Some(inputs.item("never done (overdue)".into(), Priority::Overdue))
            } else if days >= 0 {
                Some(inputs.item("never done".into(), Priority::Due))
            } else {
                None
            }
        }
        None => Some(inputs.item("never done".into(), Priority::Due)),
    }
}

fn classify_target(inputs: &GoalInputs<'_>, today: &Today, policy: &TargetPolicy) -> TodoItem {
    let target = inputs.weekly_target.unwrap_or(policy.target);
    let since = match policy.period {
        TargetPeriod::Weekly => today.week_start(),
        TargetPeriod::Daily => today.date(),
    };
    let total: f64 = inputs.logs_since(since).filter_map(|e| e.numeric()).sum();
    let threshold = target * policy.warn_at;

    let unit = inputs.goal.unit_label();
    let tally = format!("{}/{} {unit}", format_amount(total), format_amount(target))
        .trim_end()
        .to_string();

    if policy.under_is_good {
        if total > target {
            inputs.item(format!("{tally} (over budget!)"), Priority::Overdue)
        } else if total > threshold {
            inputs.item(format!("{tally} (approaching limit)"), Priority::Due)
        } else {
            inputs.item(tally, Priority::Info)
        }
    } else if total >= target {
        inputs.item(format!("{tally} (target met!)"), Priority::Info)
    } else if today.weekday_index() >= LATE_WEEK && total < threshold {
        inputs.item(format!("{tally} (behind pace)"), Priority::Overdue)
    } else if total < target {
        inputs.item(tally, Priority::Due)
    } else {
        inputs.item(tally, Priority::Info)
    }
}

fn classify_stale(
    inputs: &GoalInputs<'_>,
    today: &Today,
    stale_days: i64,
    overdue_days: i64,
) -> Option<TodoItem> {
    let Some(last) = inputs.last_log_date() else {
        return Some(never_started(inputs, today));
    };

    let days = today.days_since(last);
    if days >= overdue_days {
        return Some(inputs.item(
            format!("{days} days since last session"),
            Priority::Overdue,
        ));
    }
    if days >= stale_days {
        return Some(inputs.item(format!("{days} days since last session"), Priority::Due));
    }

    let pos = inputs.position(today);
    match pos.current {
        Some(current) => Some(inputs.item(
            format!("on {current} ({}/{})", pos.done, pos.total),
            Priority::Info,
        )),
        None if pos.total > 0 => Some(inputs.item(
            format!("all complete ({}/{})", pos.done, pos.total),
            Priority::Info,
        )),
        None => None,
    }
}

/// A stale-policy goal with no log at all. Checks this week's task list,
/// then whether the current item has booked tasks.
fn never_started(inputs: &GoalInputs<'_>, today: &Today) -> TodoItem {
    let week_todo = inputs.todos.unit_todo(&inputs.goal.id, &inputs.week.unit());
    let pending: Vec<_> = week_todo.pending().collect();

    if !pending.is_empty() {
        let unscheduled: Vec<_> = pending.iter().copied().filter(|t| !t.is_scheduled()).collect();
        if unscheduled.is_empty() {
            return inputs.item(
                format!("{} scheduled", join_labels(pending, TASK_PREVIEW)),
                Priority::Due,
            );
        }
        let more = unscheduled.len().saturating_sub(TASK_PREVIEW);
        let suffix = if more > 0 {
            format!(" (+{more} more)")
        } else {
            String::new()
        };
        return inputs.item(
            format!(
                "{}{suffix} not scheduled",
                join_labels(unscheduled, TASK_PREVIEW)
            ),
            Priority::Overdue,
        );
    }

    match inputs.position(today).current {
        Some(current) => {
            if inputs.todos.unit_todo(&inputs.goal.id, &current).has_scheduled() {
                inputs.item(
                    format!("{current} scheduled but not started"),
                    Priority::Due,
                )
            } else {
                inputs.item(format!("{current} not scheduled"), Priority::Overdue)
            }
        }
        None => inputs.item("no content found".into(), Priority::Info),
    }
}

fn classify_none(inputs: &GoalInputs<'_>, today: &Today) -> Option<TodoItem> {
    if inputs.goal.progression == Progression::None {
        return None;
    }
    let pos = inputs.position(today);
    (pos.total > 0).then(|| {
        inputs.item(
            format!("{}/{} done", pos.done, pos.total),
            Priority::Info,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogValue;
    use crate::todo::{NoTodos, TodoTask, UnitTodo};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    /// Friday 2026-01-09 at `h:m:s`.
    fn friday(h: u32, m: u32, s: u32) -> Today {
        Today::at(date(1, 9).and_hms_opt(h, m, s).unwrap())
    }

    fn week(number: u32) -> EffectiveWeek {
        EffectiveWeek {
            number,
            start: None,
            end: None,
            adjusted: false,
            paused: false,
            paused_until: None,
            reason: None,
        }
    }

    fn run(goal: &GoalConfig, logs: &[LogEntry], today: &Today) -> Option<TodoItem> {
        let week = week(2);
        classify(
            &GoalInputs {
                goal,
                logs,
                week: &week,
                items: &[],
                weekly_target: None,
                todos: &NoTodos,
            },
            today,
        )
    }

    fn daily_goal() -> GoalConfig {
        GoalConfig {
            name: "Journal".into(),
            cadence: Cadence::Daily,
            ..GoalConfig::new("journal")
        }
    }

    fn fitness_goal() -> GoalConfig {
        GoalConfig {
            name: "Fitness".into(),
            cadence: Cadence::Weekly,
            unit: Some("min".into()),
            target: Some(150.0),
            ..GoalConfig::new("fitness")
        }
    }

    // -- policy inference --------------------------------------------------

    #[test]
    fn infers_policies_from_cadence_and_progression() {
        assert_eq!(
            UrgencyPolicy::for_goal(&daily_goal()),
            UrgencyPolicy::Daily {
                due_by: DEFAULT_DUE_BY,
                nag_from: DEFAULT_NAG_FROM
            }
        );
        assert!(matches!(
            UrgencyPolicy::for_goal(&fitness_goal()),
            UrgencyPolicy::Target(TargetPolicy { target, warn_at, under_is_good: false, .. })
                if target == 150.0 && warn_at == 0.5
        ));

        let mut weekly = GoalConfig::new("w");
        weekly.cadence = Cadence::Weekly;
        assert_eq!(UrgencyPolicy::for_goal(&weekly), UrgencyPolicy::Weekly);

        let mut bi = GoalConfig::new("b");
        bi.cadence = Cadence::EveryTwoWeeks;
        assert_eq!(UrgencyPolicy::for_goal(&bi), UrgencyPolicy::Biweekly);

        let mut seq = GoalConfig::new("s");
        seq.progression = Progression::Sequential;
        assert_eq!(
            UrgencyPolicy::for_goal(&seq),
            UrgencyPolicy::Stale {
                stale_days: 5,
                overdue_days: 7
            }
        );

        let mut unordered = GoalConfig::new("u");
        unordered.progression = Progression::Unordered;
        assert_eq!(UrgencyPolicy::for_goal(&unordered), UrgencyPolicy::None);
        assert_eq!(UrgencyPolicy::for_goal(&GoalConfig::new("x")), UrgencyPolicy::None);
    }

    #[test]
    fn explicit_none_short_circuits() {
        let mut goal = daily_goal();
        goal.urgency = Some(UrgencySpec {
            kind: Some(PolicyKind::None),
            ..Default::default()
        });
        assert_eq!(UrgencyPolicy::for_goal(&goal), UrgencyPolicy::None);
        assert_eq!(run(&goal, &[], &friday(22, 0, 0)), None);
    }

    #[test]
    fn malformed_times_fall_back_to_defaults() {
        let mut goal = daily_goal();
        goal.urgency = Some(UrgencySpec {
            due_by: Some("late".into()),
            nag_from: Some("09:30".into()),
            ..Default::default()
        });
        assert_eq!(
            UrgencyPolicy::for_goal(&goal),
            UrgencyPolicy::Daily {
                due_by: DEFAULT_DUE_BY,
                nag_from: NaiveTime::from_hms_opt(9, 30, 0).unwrap()
            }
        );
    }

    // -- daily ---------------------------------------------------------------

    #[test]
    fn daily_tiers_by_time_of_day() {
        let goal = daily_goal();
        assert_eq!(run(&goal, &[], &friday(6, 59, 0)), None);
        let due = run(&goal, &[], &friday(8, 0, 0)).unwrap();
        assert_eq!(due.priority, Priority::Due);
        assert_eq!(due.message, "Journal: not done today");
        let overdue = run(&goal, &[], &friday(23, 59, 1)).unwrap();
        assert_eq!(overdue.priority, Priority::Overdue);
        assert_eq!(overdue.message, "Journal: overdue (due by 23:59)");
    }

    #[test]
    fn daily_satisfied_by_todays_log() {
        let logs = vec![LogEntry::completed(date(1, 9), "entry")];
        assert_eq!(run(&daily_goal(), &logs, &friday(23, 59, 30)), None);
    }

    #[test]
    fn time_weekly_daily_reads_todays_tasks() {
        let goal = GoalConfig {
            name: "Calendar".into(),
            cadence: Cadence::Daily,
            progression: Progression::TimeWeekly,
            ..GoalConfig::new("calendar")
        };
        let lookup = |_: &str, unit: &str| UnitTodo {
            unit: unit.to_string(),
            tasks: vec![
                TodoTask::new("fri-review", "Weekly review"),
                TodoTask::new("sat-plan", "Plan next week"),
            ],
        };
        let wk = week(3);
        let inputs = GoalInputs {
            goal: &goal,
            logs: &[],
            week: &wk,
            items: &[],
            weekly_target: None,
            todos: &lookup,
        };
        let item = classify(&inputs, &friday(10, 0, 0)).unwrap();
        assert_eq!(item.priority, Priority::Due);
        assert_eq!(item.message, "Calendar: Weekly review");

        // Thursday: no day task, but pending ones this week.
        let thursday = Today::on(date(1, 8));
        let item = classify(&inputs, &thursday).unwrap();
        assert_eq!(item.priority, Priority::Info);
        assert_eq!(item.message, "Calendar: week 3 - 2 tasks pending");
    }

    // -- weekly --------------------------------------------------------------

    #[test]
    fn weekly_idle_week_escalates_from_thursday() {
        let mut goal = GoalConfig::new("reading");
        goal.cadence = Cadence::Weekly;
        let wednesday = Today::on(date(1, 7));
        let thursday = Today::on(date(1, 8));
        assert_eq!(run(&goal, &[], &wednesday).unwrap().priority, Priority::Due);
        assert_eq!(run(&goal, &[], &thursday).unwrap().priority, Priority::Overdue);

        // Last week's log does not count.
        let logs = vec![LogEntry::amount(date(1, 4), 40.0)];
        assert_eq!(run(&goal, &logs, &thursday).unwrap().priority, Priority::Overdue);
    }

    #[test]
    fn weekly_with_logs_reports_total() {
        let mut goal = GoalConfig::new("reading");
        goal.cadence = Cadence::Weekly;
        goal.unit = Some("pages".into());
        let logs = vec![
            LogEntry::amount(date(1, 5), 20.0),
            LogEntry::amount(date(1, 6), 15.0),
        ];
        let item = run(&goal, &logs, &Today::on(date(1, 8))).unwrap();
        assert_eq!(item.priority, Priority::Info);
        assert_eq!(item.message, "reading: 35 pages this week");
    }

    // -- biweekly ------------------------------------------------------------

    #[test]
    fn biweekly_thresholds() {
        let mut goal = GoalConfig::new("haircut");
        goal.cadence = Cadence::EveryTwoWeeks;
        let today = Today::on(date(1, 20));
        let at = |d: u32| vec![LogEntry::completed(date(1, d), "cut")];
        assert_eq!(run(&goal, &at(6), &today).unwrap().priority, Priority::Overdue);
        assert_eq!(run(&goal, &at(8), &today).unwrap().priority, Priority::Due);
        let info = run(&goal, &at(10), &today).unwrap();
        assert_eq!(info.priority, Priority::Info);
        assert_eq!(info.message, "haircut: 10 days since last");
    }

    #[test]
    fn biweekly_never_done_uses_start() {
        let mut goal = GoalConfig::new("haircut");
        goal.cadence = Cadence::EveryTwoWeeks;
        let today = Today::on(date(1, 20));
        assert_eq!(run(&goal, &[], &today).unwrap().priority, Priority::Due);

        goal.start = Some(date(1, 1));
        assert_eq!(run(&goal, &[], &today).unwrap().priority, Priority::Overdue);
        goal.start = Some(date(1, 15));
        assert_eq!(run(&goal, &[], &today).unwrap().priority, Priority::Due);
        goal.start = Some(date(2, 1));
        assert_eq!(run(&goal, &[], &today), None);
    }

    // -- target --------------------------------------------------------------

    #[test]
    fn target_behind_pace_late_in_week() {
        let logs = vec![
            LogEntry::amount(date(1, 5), 30.0),
            LogEntry::amount(date(1, 7), 30.0),
        ];
        let item = run(&fitness_goal(), &logs, &friday(12, 0, 0)).unwrap();
        assert_eq!(item.priority, Priority::Overdue);
        assert_eq!(item.message, "Fitness: 60/150 min (behind pace)");
    }

    #[test]
    fn target_early_week_is_due_and_met_is_info() {
        let logs = vec![LogEntry::amount(date(1, 5), 60.0)];
        let tuesday = Today::on(date(1, 6));
        assert_eq!(run(&fitness_goal(), &logs, &tuesday).unwrap().priority, Priority::Due);

        let logs = vec![LogEntry::amount(date(1, 5), 150.0)];
        let item = run(&fitness_goal(), &logs, &friday(9, 0, 0)).unwrap();
        assert_eq!(item.priority, Priority::Info);
        assert!(item.message.ends_with("(target met!)"));
    }

    #[test]
    fn target_above_threshold_late_week_is_due() {
        let logs = vec![LogEntry::amount(date(1, 5), 100.0)];
        assert_eq!(
            run(&fitness_goal(), &logs, &friday(9, 0, 0)).unwrap().priority,
            Priority::Due
        );
    }

    #[test]
    fn target_under_is_good() {
        let goal = GoalConfig {
            name: "Spending".into(),
            cadence: Cadence::Weekly,
            unit: Some("$".into()),
            urgency: Some(UrgencySpec {
                kind: Some(PolicyKind::Target),
                target: Some(100.0),
                under_is_good: Some(true),
                ..Default::default()
            }),
            ..GoalConfig::new("spend")
        };
        let today = friday(9, 0, 0);
        let spent = |n: f64| vec![LogEntry::amount(date(1, 6), n)];
        assert_eq!(run(&goal, &spent(120.0), &today).unwrap().priority, Priority::Overdue);
        assert_eq!(run(&goal, &spent(60.0), &today).unwrap().priority, Priority::Due);
        assert_eq!(run(&goal, &spent(40.0), &today).unwrap().priority, Priority::Info);
    }

    #[test]
    fn target_uses_weekly_override_and_ignores_booleans() {
        let goal = fitness_goal();
        let logs = vec![
            LogEntry::amount(date(1, 5), 80.0),
            LogEntry {
                value: Some(LogValue::Completion(true)),
                ..LogEntry::amount(date(1, 6), 0.0)
            },
        ];
        let wk = week(1);
        let inputs = GoalInputs {
            goal: &goal,
            logs: &logs,
            week: &wk,
            items: &[],
            weekly_target: Some(60.0),
            todos: &NoTodos,
        };
        let item = classify(&inputs, &friday(9, 0, 0)).unwrap();
        assert_eq!(item.message, "Fitness: 80/60 min (target met!)");
    }

    // -- stale ---------------------------------------------------------------

    fn hindi() -> GoalConfig {
        GoalConfig {
            name: "Hindi".into(),
            progression: Progression::Sequential,
            content: Some("hindi".into()),
            ..GoalConfig::new("hindi")
        }
    }

    fn chapters() -> Vec<String> {
        vec!["ch1".into(), "ch2".into(), "ch3".into()]
    }

    fn run_hindi(logs: &[LogEntry], todos: &dyn TodoLookup, today: &Today) -> Option<TodoItem> {
        let goal = hindi();
        let items = chapters();
        let wk = week(2);
        classify(
            &GoalInputs {
                goal: &goal,
                logs,
                week: &wk,
                items: &items,
                weekly_target: None,
                todos,
            },
            today,
        )
    }

    #[test]
    fn stale_thresholds_and_position() {
        let today = Today::on(date(1, 20));
        let at = |d: u32| vec![LogEntry::completed(date(1, d), "ch1")];
        assert_eq!(
            run_hindi(&at(13), &NoTodos, &today).unwrap().priority,
            Priority::Overdue
        );
        assert_eq!(run_hindi(&at(15), &NoTodos, &today).unwrap().priority, Priority::Due);
        let info = run_hindi(&at(18), &NoTodos, &today).unwrap();
        assert_eq!(info.priority, Priority::Info);
        assert_eq!(info.message, "Hindi: on ch2 (1/3)");
    }

    #[test]
    fn never_started_prefers_week_tasks() {
        let today = Today::on(date(1, 20));
        let lookup = |_: &str, unit: &str| {
            if unit == "week-2" {
                UnitTodo {
                    unit: unit.into(),
                    tasks: vec![
                        TodoTask::new("a", "Alphabet"),
                        TodoTask::new("b", "Numbers"),
                        TodoTask::new("c", "Greetings"),
                    ],
                }
            } else {
                UnitTodo::empty(unit)
            }
        };
        let item = run_hindi(&[], &lookup, &today).unwrap();
        assert_eq!(item.priority, Priority::Overdue);
        assert_eq!(
            item.message,
            "Hindi: Alphabet, Numbers (+1 more) not scheduled"
        );
    }

    #[test]
    fn never_started_all_week_tasks_scheduled_is_due() {
        let today = Today::on(date(1, 20));
        let lookup = |_: &str, unit: &str| UnitTodo {
            unit: unit.into(),
            tasks: vec![TodoTask {
                event_id: Some("evt".into()),
                ..TodoTask::new("a", "Alphabet")
            }],
        };
        let item = run_hindi(&[], &lookup, &today).unwrap();
        assert_eq!(item.priority, Priority::Due);
        assert_eq!(item.message, "Hindi: Alphabet scheduled");
    }

    #[test]
    fn never_started_falls_back_to_current_item() {
        let today = Today::on(date(1, 20));
        let item = run_hindi(&[], &NoTodos, &today).unwrap();
        assert_eq!(item.priority, Priority::Overdue);
        assert_eq!(item.message, "Hindi: ch1 not scheduled");

        let lookup = |_: &str, unit: &str| {
            if unit == "ch1" {
                UnitTodo {
                    unit: unit.into(),
                    tasks: vec![TodoTask {
                        done: true,
                        scheduled_for: Some("2026-01-21T18:00".into()),
                        ..TodoTask::new("read", "Read")
                    }],
                }
            } else {
                UnitTodo::empty(unit)
            }
        };
        let item = run_hindi(&[], &lookup, &today).unwrap();
        assert_eq!(item.priority, Priority::Due);
        assert_eq!(item.message, "Hindi: ch1 scheduled but not started");
    }

    // -- none / paused -------------------------------------------------------

    #[test]
    fn none_policy_shows_progress_line() {
        let goal = GoalConfig {
            progression: Progression::Unordered,
            content: Some("poems".into()),
            ..GoalConfig::new("poems")
        };
        let items = chapters();
        let logs = vec![LogEntry::completed(date(1, 2), "ch3")];
        let wk = week(1);
        let item = classify(
            &GoalInputs {
                goal: &goal,
                logs: &logs,
                week: &wk,
                items: &items,
                weekly_target: None,
                todos: &NoTodos,
            },
            &Today::on(date(1, 5)),
        )
        .unwrap();
        assert_eq!(item.priority, Priority::Info);
        assert_eq!(item.message, "poems: 1/3 done");
    }

    #[test]
    fn paused_goal_is_informational() {
        let goal = daily_goal();
        let mut wk = week(2);
        wk.paused = true;
        wk.adjusted = true;
        wk.paused_until = Some(date(1, 20));
        wk.reason = Some("travel".into());
        let item = classify(
            &GoalInputs {
                goal: &goal,
                logs: &[],
                week: &wk,
                items: &[],
                weekly_target: None,
                todos: &NoTodos,
            },
            &friday(23, 59, 30),
        )
        .unwrap();
        assert_eq!(item.priority, Priority::Info);
        assert_eq!(item.message, "Journal: paused until 2026-01-20 (travel)");
    }

    #[test]
    fn priority_rank_order() {
        assert!(Priority::Overdue < Priority::Due);
        assert!(Priority::Due < Priority::Info);
        assert_eq!(Priority::Info.rank(), 2);
    }
}
