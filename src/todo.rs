//! Per-unit task lists (`_data/todos/<goal>/<unit>.yml`).
//!
//! A unit is a week (`week-3`) or a content item (`01-foundations`). The
//! urgency classifier reads these lists for two signals: today's tasks of a
//! time-weekly daily goal, and the "never started" fallback of stale goals.

use serde::{Deserialize, Serialize};

/// One task in a unit's list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoTask {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// ISO datetime the task is booked for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<String>,
    /// External calendar event backing the booking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl TodoTask {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Display name, falling back to the id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_for.is_some() || self.event_id.is_some()
    }
}

/// A unit's task list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitTodo {
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub tasks: Vec<TodoTask>,
}

impl UnitTodo {
    pub fn empty(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            tasks: Vec::new(),
        }
    }

    pub fn pending(&self) -> impl Iterator<Item = &TodoTask> {
        self.tasks.iter().filter(|t| !t.done)
    }

    pub fn completed(&self) -> impl Iterator<Item = &TodoTask> {
        self.tasks.iter().filter(|t| t.done)
    }

    pub fn has_scheduled(&self) -> bool {
        self.tasks.iter().any(TodoTask::is_scheduled)
    }

    /// Tasks whose id names today's weekday (`mon`..`sun`).
    pub fn for_day<'a>(&'a self, day_label: &'a str) -> impl Iterator<Item = &'a TodoTask> {
        self.tasks
            .iter()
            .filter(move |t| t.id.to_lowercase().contains(day_label))
    }
}

/// Changes applied to one task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub done: Option<bool>,
    pub notes: Option<String>,
    pub scheduled_for: Option<String>,
    pub event_id: Option<String>,
    /// Drop `scheduled_for` and `event_id`.
    pub clear_schedule: bool,
}

impl TaskPatch {
    pub fn mark_done(notes: Option<String>) -> Self {
        Self {
            done: Some(true),
            notes,
            ..Default::default()
        }
    }

    /// Apply to `task`, returning the event id removed by `clear_schedule`.
    pub fn apply(&self, task: &mut TodoTask) -> Option<String> {
        if let Some(done) = self.done {
            task.done = done;
        }
        if let Some(notes) = &self.notes {
            task.notes = Some(notes.clone());
        }
        if let Some(when) = &self.scheduled_for {
            task.scheduled_for = Some(when.clone());
        }
        if let Some(event) = &self.event_id {
            task.event_id = Some(event.clone());
        }
        if self.clear_schedule {
            task.scheduled_for = None;
            task.event_id.take()
        } else {
            None
        }
    }
}

/// Read access to unit task lists for the classifier. Implementations
/// degrade failures to an empty list.
pub trait TodoLookup {
    fn unit_todo(&self, goal_id: &str, unit: &str) -> UnitTodo;
}

impl<F> TodoLookup for F
where
    F: Fn(&str, &str) -> UnitTodo,
{
    fn unit_todo(&self, goal_id: &str, unit: &str) -> UnitTodo {
        self(goal_id, unit)
    }
}

/// A lookup with no task lists at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTodos;

impl TodoLookup for NoTodos {
    fn unit_todo(&self, _goal_id: &str, unit: &str) -> UnitTodo {
        UnitTodo::empty(unit)
    }
}

/// A not-done task, located by goal and unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTask {
    pub goal_id: String,
    pub unit: String,
    pub task: TodoTask,
}

/// Join up to `limit` task labels with `, `.
pub fn join_labels<'a>(tasks: impl IntoIterator<Item = &'a TodoTask>, limit: usize) -> String {
    tasks
        .into_iter()
        .take(limit)
        .map(TodoTask::label)
        .collect::<Vec<_>>()
        .join(", ")
}
