//! Calendar schedule and per-goal week adjustments.
//!
//! The schedule is an ordered list of week ranges. A goal's
//! `AdjustmentState` can pause time, pin a week, or shift by an offset;
//! `resolve_week` applies these with a fixed precedence:
//!
//! 1. **Paused**: `paused_until` is in the future; keep the base week, flagged paused
//! 2. **Override**: `override_week` pins the week number
//! 3. **Offset**: `offset_weeks` shifts the base week back (min 1)
//! 4. **Unadjusted**: the base week

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::Today;
use crate::error::ScheduleError;

/// One calendar week of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRecord {
    pub number: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRecord {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Per-goal schedule extras.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalSchedule {
    /// Week number → target for that week.
    #[serde(default)]
    pub weekly_targets: BTreeMap<u32, f64>,
}

/// The whole `schedule.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub weeks: Vec<WeekRecord>,
    #[serde(default)]
    pub goals: BTreeMap<String, GoalSchedule>,
}

impl Schedule {
    pub fn new(weeks: Vec<WeekRecord>) -> Self {
        Self {
            weeks,
            goals: BTreeMap::new(),
        }
    }

    /// Check the ordering invariant: sorted by number, each range
    /// non-inverted and starting after the previous one ends.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let mut previous: Option<&WeekRecord> = None;
        for week in &self.weeks {
            if week.number == 0 {
                return Err(ScheduleError::InvalidWeek { number: 0 });
            }
            if week.end < week.start {
                return Err(ScheduleError::Inverted {
                    number: week.number,
                });
            }
            if let Some(prev) = previous {
                if week.number <= prev.number || week.start <= prev.end {
                    return Err(ScheduleError::Overlap {
                        number: week.number,
                    });
                }
            }
            previous = Some(week);
        }
        Ok(())
    }

    pub fn week(&self, number: u32) -> Option<&WeekRecord> {
        self.weeks.iter().find(|w| w.number == number)
    }

    /// Week-specific target override for `goal_id`.
    pub fn weekly_target(&self, goal_id: &str, week: u32) -> Option<f64> {
        self.goals
            .get(goal_id)
            .and_then(|g| g.weekly_targets.get(&week))
            .copied()
    }

    /// The week containing `date`, clamped to the first/last week outside
    /// the schedule's span.
    pub fn base_week(&self, date: NaiveDate) -> BaseWeek {
        let (Some(first), Some(last)) = (self.weeks.first(), self.weeks.last()) else {
            return BaseWeek::unknown();
        };
        if let Some(week) = self.weeks.iter().find(|w| w.contains(date)) {
            return BaseWeek::from(week);
        }
        if date < first.start {
            return BaseWeek::from(first);
        }
        if date > last.end {
            return BaseWeek::from(last);
        }
        // A gap between weeks: stay on the week that started most recently.
        self.weeks
            .iter()
            .rev()
            .find(|w| w.start <= date)
            .map(BaseWeek::from)
            .unwrap_or_else(BaseWeek::unknown)
    }
}

/// A week number with optional known dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseWeek {
    pub number: u32,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl BaseWeek {
    /// Week 1 with unknown dates, used when the schedule is empty.
    pub fn unknown() -> Self {
        Self {
            number: 1,
            start: None,
            end: None,
        }
    }
}

impl From<&WeekRecord> for BaseWeek {
    fn from(w: &WeekRecord) -> Self {
        Self {
            number: w.number,
            start: Some(w.start),
            end: Some(w.end),
        }
    }
}

/// Mutable per-goal adjustment state, persisted in `current.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentState {
    /// Positive = behind schedule.
    #[serde(default)]
    pub offset_weeks: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_week: Option<u32>,
    #[serde(
        default,
        deserialize_with = "crate::clock::lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub paused_until: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment_reason: Option<String>,
}

impl AdjustmentState {
    /// Pin the goal to `week`. Clears any offset.
    pub fn set_override(&mut self, week: u32, reason: Option<String>) -> Result<(), ScheduleError> {
        if week == 0 {
            return Err(ScheduleError::InvalidWeek { number: 0 });
        }
        self.override_week = Some(week);
        self.offset_weeks = 0;
        self.adjustment_reason = reason;
        Ok(())
    }

    /// Shift the goal `weeks` behind schedule. Clears any override.
    pub fn set_offset(&mut self, weeks: i64, reason: Option<String>) {
        self.offset_weeks = weeks;
        self.override_week = None;
        self.adjustment_reason = reason;
    }

    /// Suspend progression until `until`. Override and offset are kept.
    pub fn pause(&mut self, until: NaiveDate, reason: Option<String>) {
        self.paused_until = Some(until);
        if reason.is_some() {
            self.adjustment_reason = reason;
        }
    }

    pub fn resume(&mut self) {
        self.paused_until = None;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_unadjusted(&self) -> bool {
        self.offset_weeks == 0 && self.override_week.is_none() && self.paused_until.is_none()
    }
}

/// A requested change to a goal's adjustment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Override(u32),
    Offset(i64),
    Pause(NaiveDate),
    Resume,
    Clear,
}

impl Adjustment {
    pub fn apply(
        &self,
        state: &mut AdjustmentState,
        reason: Option<String>,
    ) -> Result<(), ScheduleError> {
        match *self {
            Self::Override(week) => state.set_override(week, reason)?,
            Self::Offset(weeks) => state.set_offset(weeks, reason),
            Self::Pause(until) => state.pause(until, reason),
            Self::Resume => state.resume(),
            Self::Clear => state.clear(),
        }
        Ok(())
    }
}

/// The week actually in effect for a goal today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveWeek {
    pub number: u32,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub adjusted: bool,
    pub paused: bool,
    pub paused_until: Option<NaiveDate>,
    pub reason: Option<String>,
}

impl EffectiveWeek {
    fn unadjusted(base: BaseWeek) -> Self {
        Self {
            number: base.number,
            start: base.start,
            end: base.end,
            adjusted: false,
            paused: false,
            paused_until: None,
            reason: None,
        }
    }

    /// The week's todo unit name (`week-N`).
    pub fn unit(&self) -> String {
        format!("week-{}", self.number)
    }
}

impl fmt::Display for EffectiveWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "?".into());
        write!(f, "week {} ({} to {})", self.number, day(self.start), day(self.end))?;
        if self.paused {
            write!(f, " [paused")?;
            if let Some(until) = self.paused_until {
                write!(f, " until {until}")?;
            }
            write!(f, "]")?;
        } else if self.adjusted {
            write!(f, " [adjusted]")?;
        }
        if let Some(reason) = &self.reason {
            write!(f, ": {reason}")?;
        }
        Ok(())
    }
}

/// Resolve the week in effect for a goal on `today`.
pub fn resolve_week(schedule: &Schedule, state: &AdjustmentState, today: &Today) -> EffectiveWeek {
    let base = schedule.base_week(today.date());

    if let Some(until) = state.paused_until.filter(|until| today.date() < *until) {
        return EffectiveWeek {
            adjusted: true,
            paused: true,
            paused_until: Some(until),
            reason: Some(
                state
                    .adjustment_reason
                    .clone()
                    .unwrap_or_else(|| "Paused".into()),
            ),
            ..EffectiveWeek::unadjusted(base)
        };
    }

    if let Some(number) = state.override_week.filter(|n| *n > 0) {
        let week = schedule.week(number);
        let reason = match (&state.adjustment_reason, week) {
            (Some(reason), _) => Some(reason.clone()),
            (None, Some(_)) => Some(format!("Overridden to week {number}")),
            (None, None) => None,
        };
        return EffectiveWeek {
            number,
            start: week.map(|w| w.start),
            end: week.map(|w| w.end),
            adjusted: true,
            paused: false,
            paused_until: None,
            reason,
        };
    }

    if state.offset_weeks != 0 {
        let shifted = (i64::from(base.number) - state.offset_weeks).max(1);
        let found = u32::try_from(shifted).ok().and_then(|n| schedule.week(n));
        if let Some(week) = found {
            return EffectiveWeek {
                number: week.number,
                start: Some(week.start),
                end: Some(week.end),
                adjusted: true,
                paused: false,
                paused_until: None,
                reason: Some(state.adjustment_reason.clone().unwrap_or_else(|| {
                    format!("Offset by {} weeks", state.offset_weeks)
                })),
            };
        }
        tracing::debug!(
            shifted,
            "offset week missing from schedule, using unadjusted week"
        );
    }

    EffectiveWeek::unadjusted(base)
}
