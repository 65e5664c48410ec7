//! Path resolution for goalpost.
//!
//! Provides `GoalpostPaths` (XDG config and cache directories) and `RepoPaths`
//! (the `_data/` layout inside a goals repository).

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Environment variable naming the goals repository root.
pub const REPO_ENV: &str = "GOALPOST_REPO";

/// How many parent directories `discover_repo` climbs before giving up.
const MAX_ASCENT: usize = 10;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(goalpost::paths::no_home),
        help("Set the HOME environment variable or ensure a valid user profile exists.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(goalpost::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no goals repository found from {start}")]
    #[diagnostic(
        code(goalpost::paths::repo_not_found),
        help(
            "Pass `--repo <dir>`, set GOALPOST_REPO, or set `repo_path` in goalpost.toml. \
             A goals repository contains `_data/goals.yml`."
        )
    )]
    RepoNotFound { start: String },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG-compliant directories for goalpost.
#[derive(Debug, Clone)]
pub struct GoalpostPaths {
    /// `$XDG_CONFIG_HOME/goalpost/`
    pub config_dir: PathBuf,
    /// `$XDG_CACHE_HOME/goalpost/`
    pub cache_dir: PathBuf,
}

impl GoalpostPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("goalpost");

        let cache_dir = std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".cache"))
            .join("goalpost");

        Ok(Self {
            config_dir,
            cache_dir,
        })
    }

    /// Path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("goalpost.toml")
    }

    /// Default location of the vocabulary mastery snapshot.
    pub fn mastery_cache_file(&self) -> PathBuf {
        self.cache_dir.join("mastery.json")
    }
}

/// File layout of a goals repository.
#[derive(Debug, Clone)]
pub struct RepoPaths {
    /// Repository root; goal `content` paths are relative to it.
    pub root: PathBuf,
    /// `root/_data/`
    pub data_dir: PathBuf,
}

impl RepoPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let data_dir = root.join("_data");
        Self { root, data_dir }
    }

    /// Resolve the repository root.
    ///
    /// Precedence: explicit path, then `GOALPOST_REPO`, then the settings'
    /// `repo_path`, then a walk up from `start` looking for `_data/goals.yml`.
    pub fn locate(
        explicit: Option<&Path>,
        configured: Option<&Path>,
        start: &Path,
    ) -> PathResult<Self> {
        if let Some(p) = explicit {
            return Ok(Self::new(p));
        }
        if let Ok(env) = std::env::var(REPO_ENV) {
            if !env.is_empty() {
                return Ok(Self::new(env));
            }
        }
        if let Some(p) = configured {
            return Ok(Self::new(p));
        }
        Self::discover(start)
    }

    /// Walk up from `start` to the first directory holding `_data/goals.yml`.
    pub fn discover(start: &Path) -> PathResult<Self> {
        let mut current = Some(start);
        for _ in 0..MAX_ASCENT {
            let Some(dir) = current else { break };
            if dir.join("_data").join("goals.yml").is_file() {
                return Ok(Self::new(dir));
            }
            current = dir.parent();
        }
        Err(PathError::RepoNotFound {
            start: start.display().to_string(),
        })
    }

    pub fn goals_file(&self) -> PathBuf {
        self.data_dir.join("goals.yml")
    }

    pub fn schedule_file(&self) -> PathBuf {
        self.data_dir.join("schedule.yml")
    }

    /// Per-goal adjustment state and free-form progress notes.
    pub fn current_file(&self) -> PathBuf {
        self.data_dir.join("current.yml")
    }

    pub fn log_file(&self, goal_id: &str) -> PathBuf {
        self.data_dir.join("logs").join(format!("{goal_id}.yml"))
    }

    pub fn todos_dir(&self) -> PathBuf {
        self.data_dir.join("todos")
    }

    pub fn todo_file(&self, goal_id: &str, unit: &str) -> PathBuf {
        self.todos_dir().join(goal_id).join(format!("{unit}.yml"))
    }

    /// Resolve a goal's `content` path against the repository root.
    pub fn content_dir(&self, content: &str) -> PathBuf {
        self.root.join(content)
    }

    /// Create the `_data/` skeleton. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [
            &self.data_dir,
            &self.data_dir.join("logs"),
            &self.todos_dir(),
        ] {
            std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_paths_derive_from_root() {
        let repo = RepoPaths::new("/goals");
        assert_eq!(repo.goals_file(), PathBuf::from("/goals/_data/goals.yml"));
        assert_eq!(
            repo.log_file("hindi"),
            PathBuf::from("/goals/_data/logs/hindi.yml")
        );
        assert_eq!(
            repo.todo_file("hindi", "week-2"),
            PathBuf::from("/goals/_data/todos/hindi/week-2.yml")
        );
        assert_eq!(
            repo.content_dir("hindi/chapters"),
            PathBuf::from("/goals/hindi/chapters")
        );
    }

    #[test]
    fn discover_walks_up_to_data_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = RepoPaths::new(dir.path());
        repo.ensure_dirs().unwrap();
        std::fs::write(repo.goals_file(), "goals: {}\n").unwrap();

        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = RepoPaths::discover(&nested).unwrap();
        assert_eq!(found.root, dir.path());
    }

    #[test]
    fn discover_fails_without_goals_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            RepoPaths::discover(dir.path()),
            Err(PathError::RepoNotFound { .. })
        ));
    }

    #[test]
    fn explicit_path_wins() {
        let repo = RepoPaths::locate(
            Some(Path::new("/explicit")),
            Some(Path::new("/configured")),
            Path::new("/"),
        )
        .unwrap();
        assert_eq!(repo.root, PathBuf::from("/explicit"));
    }

    #[test]
    fn xdg_dirs_are_namespaced() {
        let paths = GoalpostPaths {
            config_dir: PathBuf::from("/cfg/goalpost"),
            cache_dir: PathBuf::from("/cache/goalpost"),
        };
        assert_eq!(
            paths.settings_file(),
            PathBuf::from("/cfg/goalpost/goalpost.toml")
        );
        assert_eq!(
            paths.mastery_cache_file(),
            PathBuf::from("/cache/goalpost/mastery.json")
        );
    }
}
