//! Collaborator boundaries over the repository's `_data/` files.
//!
//! Each concern is a trait so the daily pass can run against any source;
//! [`YamlRepo`] is the filesystem implementation. Missing files read as
//! empty. Malformed files are errors here and are degraded by the caller.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::goal::GoalBook;
use crate::log::{EntryPatch, LogBook, LogEntry};
use crate::paths::RepoPaths;
use crate::schedule::{AdjustmentState, Schedule};
use crate::todo::{PendingTask, TaskPatch, TodoLookup, TodoTask, UnitTodo};

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Keys of a goal's `current.yml` section owned by [`AdjustmentState`].
const ADJUSTMENT_KEYS: [&str; 4] = [
    "offset_weeks",
    "override_week",
    "paused_until",
    "adjustment_reason",
];

/// A YAML document with nothing but whitespace and comments.
pub fn is_blank_yaml(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════════════════

/// Source of goal configuration.
pub trait GoalSource {
    fn goals(&self) -> StoreResult<GoalBook>;
}

/// Per-goal event log.
pub trait LogStore {
    /// Entries sorted by date; same-day entries keep file order.
    fn logs(&self, goal_id: &str) -> StoreResult<Vec<LogEntry>>;

    fn append(&self, goal_id: &str, entry: LogEntry) -> StoreResult<()>;

    fn edit(
        &self,
        goal_id: &str,
        date: NaiveDate,
        path: Option<&str>,
        patch: &EntryPatch,
    ) -> StoreResult<LogEntry>;

    fn delete(&self, goal_id: &str, date: NaiveDate, path: Option<&str>)
    -> StoreResult<LogEntry>;
}

/// Calendar weeks and per-goal adjustment state.
pub trait ScheduleSource {
    fn schedule(&self) -> StoreResult<Schedule>;

    fn adjustment(&self, goal_id: &str) -> StoreResult<AdjustmentState>;

    /// Persist `state`, leaving every other key of the goal's section alone.
    fn save_adjustment(&self, goal_id: &str, state: &AdjustmentState) -> StoreResult<()>;
}

/// Per-unit task lists.
pub trait TodoSource {
    /// The unit's list, empty when none exists.
    fn unit_todo(&self, goal_id: &str, unit: &str) -> StoreResult<UnitTodo>;

    fn save_unit_todo(&self, goal_id: &str, todo: &UnitTodo) -> StoreResult<()>;

    /// Patch one task and return it as saved.
    fn update_task(
        &self,
        goal_id: &str,
        unit: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> StoreResult<TodoTask>;

    /// Not-done tasks across all units, sorted by goal then unit.
    fn pending_tasks(&self, goal_id: Option<&str>) -> StoreResult<Vec<PendingTask>>;
}

/// Everything the tracker reads and writes.
pub trait Repo: GoalSource + LogStore + ScheduleSource + TodoSource {
    /// Root that goal `content` paths are relative to.
    fn content_root(&self) -> &Path;
}

/// [`TodoLookup`] over a [`TodoSource`] that logs failures and answers
/// with an empty list.
pub struct LenientTodos<'a, S: ?Sized>(pub &'a S);

impl<S: TodoSource + ?Sized> TodoLookup for LenientTodos<'_, S> {
    fn unit_todo(&self, goal_id: &str, unit: &str) -> UnitTodo {
        self.0.unit_todo(goal_id, unit).unwrap_or_else(|e| {
            tracing::warn!(goal = %goal_id, unit = %unit, error = %e, "unreadable task list");
            UnitTodo::empty(unit)
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// YAML files
// ═══════════════════════════════════════════════════════════════════════

/// The filesystem repository.
#[derive(Debug, Clone)]
pub struct YamlRepo {
    paths: RepoPaths,
}

impl YamlRepo {
    pub fn new(paths: RepoPaths) -> Self {
        Self { paths }
    }

    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(RepoPaths::new(root))
    }

    pub fn paths(&self) -> &RepoPaths {
        &self.paths
    }

    fn load_log_book(&self, goal_id: &str) -> StoreResult<LogBook> {
        read_yaml(&self.paths.log_file(goal_id))
    }

    fn save_log_book(&self, goal_id: &str, book: &LogBook) -> StoreResult<()> {
        write_yaml(&self.paths.log_file(goal_id), book)
    }

    fn load_current(&self) -> StoreResult<serde_yaml::Mapping> {
        read_yaml(&self.paths.current_file())
    }

    fn units_of(&self, goal_dir: &Path) -> StoreResult<Vec<String>> {
        let mut units: Vec<String> = list_dir(goal_dir)?
            .into_iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == "yml"))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        units.sort();
        Ok(units)
    }
}

impl GoalSource for YamlRepo {
    fn goals(&self) -> StoreResult<GoalBook> {
        let path = self.paths.goals_file();
        let Some(text) = read_text(&path)? else {
            tracing::debug!(path = %path.display(), "no goals file");
            return Ok(GoalBook::default());
        };
        GoalBook::from_yaml(&text).map_err(|e| yaml_error(&path, e))
    }
}

impl LogStore for YamlRepo {
    fn logs(&self, goal_id: &str) -> StoreResult<Vec<LogEntry>> {
        let mut entries = self.load_log_book(goal_id)?.entries();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    fn append(&self, goal_id: &str, entry: LogEntry) -> StoreResult<()> {
        let mut book = self.load_log_book(goal_id)?;
        tracing::debug!(goal = %goal_id, date = %entry.date, "appending log entry");
        book.append(entry);
        self.save_log_book(goal_id, &book)
    }

    fn edit(
        &self,
        goal_id: &str,
        date: NaiveDate,
        path: Option<&str>,
        patch: &EntryPatch,
    ) -> StoreResult<LogEntry> {
        let mut book = self.load_log_book(goal_id)?;
        let updated = book
            .edit(date, path, patch)
            .ok_or_else(|| entry_not_found(goal_id, date, path))?;
        self.save_log_book(goal_id, &book)?;
        Ok(updated)
    }

    fn delete(
        &self,
        goal_id: &str,
        date: NaiveDate,
        path: Option<&str>,
    ) -> StoreResult<LogEntry> {
        let mut book = self.load_log_book(goal_id)?;
        let removed = book
            .delete(date, path)
            .ok_or_else(|| entry_not_found(goal_id, date, path))?;
        self.save_log_book(goal_id, &book)?;
        Ok(removed)
    }
}

impl ScheduleSource for YamlRepo {
    fn schedule(&self) -> StoreResult<Schedule> {
        let schedule: Schedule = read_yaml(&self.paths.schedule_file())?;
        if let Err(e) = schedule.validate() {
            tracing::warn!(error = %e, "inconsistent schedule weeks");
        }
        Ok(schedule)
    }

    fn adjustment(&self, goal_id: &str) -> StoreResult<AdjustmentState> {
        let current = self.load_current()?;
        let Some(section) = current.get(goal_id) else {
            return Ok(AdjustmentState::default());
        };
        if section.is_null() {
            return Ok(AdjustmentState::default());
        }
        serde_yaml::from_value(section.clone()).map_err(|e| StoreError::Yaml {
            path: self.paths.current_file().display().to_string(),
            message: format!("{goal_id}: {e}"),
        })
    }

    fn save_adjustment(&self, goal_id: &str, state: &AdjustmentState) -> StoreResult<()> {
        let path = self.paths.current_file();
        let mut current = self.load_current()?;

        let mut section = match current.remove(goal_id) {
            Some(serde_yaml::Value::Mapping(m)) => m,
            _ => serde_yaml::Mapping::new(),
        };
        for key in ADJUSTMENT_KEYS {
            section.remove(key);
        }
        let serde_yaml::Value::Mapping(fields) =
            serde_yaml::to_value(state).map_err(|e| yaml_error(&path, e))?
        else {
            return Err(StoreError::Yaml {
                path: path.display().to_string(),
                message: "adjustment state did not serialize to a mapping".into(),
            });
        };
        section.extend(fields);

        current.insert(goal_id.into(), serde_yaml::Value::Mapping(section));
        tracing::debug!(goal = %goal_id, "saving week adjustment");
        write_yaml(&path, &current)
    }
}

impl TodoSource for YamlRepo {
    fn unit_todo(&self, goal_id: &str, unit: &str) -> StoreResult<UnitTodo> {
        let mut todo: UnitTodo = read_yaml(&self.paths.todo_file(goal_id, unit))?;
        if todo.unit.is_empty() {
            todo.unit = unit.to_string();
        }
        Ok(todo)
    }

    fn save_unit_todo(&self, goal_id: &str, todo: &UnitTodo) -> StoreResult<()> {
        write_yaml(&self.paths.todo_file(goal_id, &todo.unit), todo)
    }

    fn update_task(
        &self,
        goal_id: &str,
        unit: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> StoreResult<TodoTask> {
        let mut todo = self.unit_todo(goal_id, unit)?;
        let task = todo
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| StoreError::TaskNotFound {
                goal: goal_id.to_string(),
                unit: unit.to_string(),
                task: task_id.to_string(),
            })?;
        if let Some(event) = patch.apply(task) {
            tracing::info!(goal = %goal_id, task = %task_id, event = %event, "dropped calendar booking");
        }
        let updated = task.clone();
        self.save_unit_todo(goal_id, &todo)?;
        Ok(updated)
    }

    fn pending_tasks(&self, goal_id: Option<&str>) -> StoreResult<Vec<PendingTask>> {
        let mut goal_dirs: Vec<PathBuf> = list_dir(&self.paths.todos_dir())?
            .into_iter()
            .filter(|p| p.is_dir())
            .collect();
        goal_dirs.sort();

        let mut out = Vec::new();
        for dir in goal_dirs {
            let Some(goal) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if goal_id.is_some_and(|wanted| wanted != goal) {
                continue;
            }
            for unit in self.units_of(&dir)? {
                let todo = self.unit_todo(goal, &unit)?;
                out.extend(todo.pending().map(|task| PendingTask {
                    goal_id: goal.to_string(),
                    unit: unit.clone(),
                    task: task.clone(),
                }));
            }
        }
        Ok(out)
    }
}

impl Repo for YamlRepo {
    fn content_root(&self) -> &Path {
        &self.paths.root
    }
}

// ═══════════════════════════════════════════════════════════════════════
// File helpers
// ═══════════════════════════════════════════════════════════════════════

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn yaml_error(path: &Path, e: serde_yaml::Error) -> StoreError {
    StoreError::Yaml {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn entry_not_found(goal_id: &str, date: NaiveDate, path: Option<&str>) -> StoreError {
    StoreError::EntryNotFound {
        goal: goal_id.to_string(),
        date: date.to_string(),
        path: path.map(str::to_string),
    }
}

/// File contents, or `None` when the file does not exist.
fn read_text(path: &Path) -> StoreResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(path, e)),
    }
}

/// Parse a YAML file; missing, blank and `null` documents yield the default.
fn read_yaml<T: DeserializeOwned + Default>(path: &Path) -> StoreResult<T> {
    let Some(text) = read_text(path)? else {
        return Ok(T::default());
    };
    if is_blank_yaml(&text) {
        return Ok(T::default());
    }
    let parsed: Option<T> = serde_yaml::from_str(&text).map_err(|e| yaml_error(path, e))?;
    Ok(parsed.unwrap_or_default())
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let text = serde_yaml::to_string(value).map_err(|e| yaml_error(path, e))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    std::fs::write(path, text).map_err(|e| io_error(path, e))
}

/// Entries of `dir`; a missing directory has none.
fn list_dir(dir: &Path) -> StoreResult<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error(dir, e)),
    };
    entries
        .map(|entry| entry.map(|e| e.path()).map_err(|e| io_error(dir, e)))
        .collect()
}
