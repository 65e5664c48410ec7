//! Tracker facade: top-level API for goalpost.
//!
//! `Tracker` binds a [`Repo`] and the goal book loaded from it, and exposes
//! the daily pass, the per-goal queries and the writers the CLI needs.
//! Goals are addressed by id, alias or display name.

use chrono::NaiveDate;
use rand::Rng;

use crate::agenda::{self, degrade};
use crate::clock::Today;
use crate::error::{GoalpostError, GoalpostResult};
use crate::goal::{GoalBook, GoalConfig};
use crate::log::{EntryPatch, LogEntry};
use crate::progression::{self, Position};
use crate::report::{self, GoalStatus, StatusPeriod};
use crate::schedule::{Adjustment, EffectiveWeek, resolve_week};
use crate::store::Repo;
use crate::todo::{PendingTask, TaskPatch, TodoTask, UnitTodo};
use crate::urgency::TodoItem;
use crate::vocab::{self, MasterySnapshot, TierWeights, VocabMastery};

/// The goal tracker over one repository.
pub struct Tracker<R> {
    repo: R,
    goals: GoalBook,
}

impl<R: Repo> Tracker<R> {
    /// Open a tracker, loading the goal book once.
    pub fn open(repo: R) -> GoalpostResult<Self> {
        let goals = repo.goals()?;
        tracing::info!(goals = goals.len(), "loaded goal book");
        Ok(Self { repo, goals })
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn goals(&self) -> &GoalBook {
        &self.goals
    }

    /// Resolve a goal by id, alias or display name.
    pub fn goal(&self, input: &str) -> GoalpostResult<&GoalConfig> {
        Ok(self.goals.require(input)?)
    }

    // ── Daily pass ──────────────────────────────────────────────────────

    /// Every goal's todo line, most urgent first.
    pub fn compute_todos(&self, today: &Today) -> Vec<TodoItem> {
        agenda::compute_todos(&self.repo, &self.goals, today)
    }

    /// Pending unit tasks of all goals, degrading read failures to none.
    pub fn pending_tasks(&self) -> Vec<PendingTask> {
        degrade(self.repo.pending_tasks(None), "task lists", "*")
    }

    /// The rendered daily check-in.
    pub fn check_in(&self, today: &Today) -> String {
        report::render_check_in(today, &self.compute_todos(today), &self.pending_tasks())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Where `goal` stands within its content.
    pub fn current(&self, goal: &str, today: &Today) -> GoalpostResult<Position> {
        let goal = self.goal(goal)?;
        let logs = self.repo.logs(&goal.id)?;
        Ok(progression::resolve(
            goal,
            self.repo.content_root(),
            &logs,
            today,
        ))
    }

    /// The week in effect for `goal` today.
    pub fn effective_week(&self, goal: &str, today: &Today) -> GoalpostResult<EffectiveWeek> {
        let goal = self.goal(goal)?;
        let schedule = self.repo.schedule()?;
        let state = self.repo.adjustment(&goal.id)?;
        Ok(resolve_week(&schedule, &state, today))
    }

    /// Status overview of one goal or all of them.
    pub fn status(
        &self,
        goal: Option<&str>,
        period: StatusPeriod,
        today: &Today,
    ) -> GoalpostResult<String> {
        let selected: Vec<&GoalConfig> = match goal {
            Some(input) => vec![self.goal(input)?],
            None => self.goals.iter().collect(),
        };
        let mut statuses = Vec::with_capacity(selected.len());
        for goal in selected {
            let logs = self.repo.logs(&goal.id)?;
            let position = progression::resolve(goal, self.repo.content_root(), &logs, today);
            statuses.push(GoalStatus {
                goal: goal.clone(),
                position,
                logs,
            });
        }
        Ok(report::render_status(&statuses, period, today))
    }

    /// Draw a vocabulary practice set.
    pub fn practice_vocab<G: Rng + ?Sized>(
        &self,
        snapshot: &MasterySnapshot,
        current_unit: i64,
        count: usize,
        weights: &TierWeights,
        rng: &mut G,
    ) -> Vec<VocabMastery> {
        if !snapshot.is_loaded() {
            tracing::warn!("mastery snapshot not loaded, practice set is empty");
        }
        vocab::practice_set(snapshot, current_unit, count, weights, rng)
    }

    // ── Writers ─────────────────────────────────────────────────────────

    /// Append `entry` to the goal's log. Returns the goal id written to.
    pub fn log(&self, goal: &str, entry: LogEntry) -> GoalpostResult<String> {
        let goal = self.goal(goal)?;
        tracing::info!(goal = %goal.id, date = %entry.date, "logging entry");
        self.repo.append(&goal.id, entry)?;
        Ok(goal.id.clone())
    }

    pub fn edit_log(
        &self,
        goal: &str,
        date: NaiveDate,
        path: Option<&str>,
        patch: &EntryPatch,
    ) -> GoalpostResult<LogEntry> {
        let goal = self.goal(goal)?;
        Ok(self.repo.edit(&goal.id, date, path, patch)?)
    }

    pub fn delete_log(
        &self,
        goal: &str,
        date: NaiveDate,
        path: Option<&str>,
    ) -> GoalpostResult<LogEntry> {
        let goal = self.goal(goal)?;
        Ok(self.repo.delete(&goal.id, date, path)?)
    }

    /// Apply `adjustment`, persist it, and return the resulting week.
    pub fn adjust(
        &self,
        goal: &str,
        adjustment: Adjustment,
        reason: Option<String>,
        today: &Today,
    ) -> GoalpostResult<EffectiveWeek> {
        let goal = self.goal(goal)?;
        let mut state = self.repo.adjustment(&goal.id)?;
        adjustment.apply(&mut state, reason)?;
        self.repo.save_adjustment(&goal.id, &state)?;
        tracing::info!(goal = %goal.id, ?adjustment, "adjusted week");
        let schedule = self.repo.schedule()?;
        Ok(resolve_week(&schedule, &state, today))
    }

    pub fn unit_todo(&self, goal: &str, unit: &str) -> GoalpostResult<UnitTodo> {
        let goal = self.goal(goal)?;
        Ok(self.repo.unit_todo(&goal.id, unit)?)
    }

    /// Replace a unit's task list.
    pub fn set_unit_todo(&self, goal: &str, todo: &UnitTodo) -> GoalpostResult<()> {
        let goal = self.goal(goal)?;
        Ok(self.repo.save_unit_todo(&goal.id, todo)?)
    }

    pub fn update_task(
        &self,
        goal: &str,
        unit: &str,
        task: &str,
        patch: &TaskPatch,
    ) -> GoalpostResult<TodoTask> {
        let goal = self.goal(goal)?;
        Ok(self.repo.update_task(&goal.id, unit, task, patch)?)
    }
}
