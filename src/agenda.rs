//! The daily agenda: one classification per goal, most urgent first.

use crate::clock::Today;
use crate::content;
use crate::goal::{GoalBook, GoalConfig};
use crate::schedule::{AdjustmentState, Schedule, resolve_week};
use crate::store::{LenientTodos, Repo, StoreResult};
use crate::urgency::{GoalInputs, TodoItem, classify};

/// Order classified lines by priority rank. The sort is stable, so goals
/// of equal priority keep their declaration order.
pub fn aggregate(items: impl IntoIterator<Item = Option<TodoItem>>) -> Vec<TodoItem> {
    let mut todos: Vec<TodoItem> = items.into_iter().flatten().collect();
    todos.sort_by_key(|t| t.priority.rank());
    todos
}

/// Classify every goal in `goals` against `repo` for `today`.
///
/// Collaborator failures never abort the pass: an unreadable log, schedule
/// or adjustment is logged and treated as empty.
pub fn compute_todos<R: Repo + ?Sized>(repo: &R, goals: &GoalBook, today: &Today) -> Vec<TodoItem> {
    let schedule: Schedule = degrade(repo.schedule(), "schedule", "*");
    let todos = LenientTodos(repo);

    aggregate(goals.iter().map(|goal| {
        let logs = degrade(repo.logs(&goal.id), "logs", &goal.id);
        let state: AdjustmentState = degrade(repo.adjustment(&goal.id), "adjustment", &goal.id);
        let week = resolve_week(&schedule, &state, today);
        let items = content_items(repo, goal);

        let inputs = GoalInputs {
            goal,
            logs: &logs,
            week: &week,
            items: &items,
            weekly_target: schedule.weekly_target(&goal.id, week.number),
            todos: &todos,
        };
        let item = classify(&inputs, today);
        tracing::debug!(goal = %goal.id, priority = ?item.as_ref().map(|i| i.priority), "classified");
        item
    }))
}

/// Content items of `goal` under the repository root; empty without `content`.
pub fn content_items<R: Repo + ?Sized>(repo: &R, goal: &GoalConfig) -> Vec<String> {
    goal.content
        .as_deref()
        .map(|c| content::discover(&repo.content_root().join(c)))
        .unwrap_or_default()
}

/// Log a collaborator failure and fall back to the empty value.
pub(crate) fn degrade<T: Default>(result: StoreResult<T>, what: &str, goal: &str) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(goal = %goal, error = %e, "unreadable {what}, treating as empty");
        T::default()
    })
}
