//! Rich diagnostic error types for goalpost.
//!
//! Each collaborator boundary (settings, repo files, schedule state, the
//! mastery snapshot, path resolution) defines its own error type with miette
//! `#[diagnostic]` derives. The computation core never returns these: the
//! daily pass degrades collaborator failures to empty inputs instead.

use miette::Diagnostic;
use thiserror::Error;

pub use crate::paths::PathError;

/// Top-level error type for goalpost.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum GoalpostError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Vocab(#[from] VocabError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read settings: {path}")]
    #[diagnostic(
        code(goalpost::config::read),
        help("Ensure the settings file exists and is readable, or remove it to use defaults.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {path}: {message}")]
    #[diagnostic(
        code(goalpost::config::parse),
        help("Check the TOML syntax in goalpost.toml. Every key is optional.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write settings: {path}")]
    #[diagnostic(
        code(goalpost::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tier weight for {tier}: {value}")]
    #[diagnostic(
        code(goalpost::config::weight),
        help("Tier weights must be finite and non-negative. They are normalised to sum to 1.0.")
    )]
    InvalidWeight { tier: String, value: f64 },

    #[error("invalid setting {key} = \"{value}\"")]
    #[diagnostic(
        code(goalpost::config::setting),
        help("Settable keys: repo_path, practice_count, mastery_cache, log_level.")
    )]
    InvalidSetting { key: String, value: String },

    #[error("unknown goal: \"{input}\"")]
    #[diagnostic(
        code(goalpost::config::unknown_goal),
        help("Available goals: {available}. Goals match by id, alias or display name.")
    )]
    UnknownGoal { input: String, available: String },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(goalpost::store::io),
        help(
            "A filesystem operation failed. Check that the repo's _data directory exists \
             and has correct permissions."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed YAML in {path}: {message}")]
    #[diagnostic(
        code(goalpost::store::yaml),
        help("The file could not be parsed. Fix the YAML by hand or restore it from git.")
    )]
    Yaml { path: String, message: String },

    #[error("no log entry for {goal} on {date}{}", path_suffix(.path))]
    #[diagnostic(
        code(goalpost::store::entry_not_found),
        help("Use `goalpost status --goal {goal} --period all` to list logged entries.")
    )]
    EntryNotFound {
        goal: String,
        date: String,
        path: Option<String>,
    },

    #[error("task {task} not found in {goal}/{unit}")]
    #[diagnostic(
        code(goalpost::store::task_not_found),
        help("Use `goalpost todo show {goal} {unit}` to list the unit's tasks.")
    )]
    TaskNotFound {
        goal: String,
        unit: String,
        task: String,
    },
}

fn path_suffix(path: &Option<String>) -> String {
    path.as_ref().map(|p| format!(" path={p}")).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Schedule errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ScheduleError {
    #[error("week ranges overlap or are out of order at week {number}")]
    #[diagnostic(
        code(goalpost::schedule::overlap),
        help("Weeks in schedule.yml must be sorted by number with non-overlapping date ranges.")
    )]
    Overlap { number: u32 },

    #[error("week {number} ends before it starts")]
    #[diagnostic(
        code(goalpost::schedule::inverted),
        help("Each week's `end` must be on or after its `start`.")
    )]
    Inverted { number: u32 },

    #[error("invalid week number: {number}")]
    #[diagnostic(
        code(goalpost::schedule::week_number),
        help("Week numbers are 1-based.")
    )]
    InvalidWeek { number: i64 },
}

// ---------------------------------------------------------------------------
// Vocab errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum VocabError {
    #[error("failed to read mastery snapshot: {path}")]
    #[diagnostic(
        code(goalpost::vocab::read),
        help("The snapshot is written by the flashcard refresher. Run it, or check the path in goalpost.toml.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mastery snapshot: {path}: {message}")]
    #[diagnostic(
        code(goalpost::vocab::parse),
        help("The snapshot must be a JSON object keyed by vocab id. Regenerate it with the refresher.")
    )]
    Parse { path: String, message: String },
}

/// Convenience result type for goalpost operations.
pub type GoalpostResult<T> = std::result::Result<T, GoalpostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_not_found_message_includes_path() {
        let err = StoreError::EntryNotFound {
            goal: "hindi".into(),
            date: "2026-01-05".into(),
            path: Some("ch1".into()),
        };
        assert_eq!(
            err.to_string(),
            "no log entry for hindi on 2026-01-05 path=ch1"
        );

        let err = StoreError::EntryNotFound {
            goal: "hindi".into(),
            date: "2026-01-05".into(),
            path: None,
        };
        assert_eq!(err.to_string(), "no log entry for hindi on 2026-01-05");
    }

    #[test]
    fn subsystem_errors_convert_to_top_level() {
        let err: GoalpostError = ScheduleError::InvalidWeek { number: 0 }.into();
        assert!(matches!(err, GoalpostError::Schedule(_)));
    }
}
