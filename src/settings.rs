//! User settings, persisted as TOML in `$XDG_CONFIG_HOME/goalpost/goalpost.toml`.
//!
//! Every key is optional. A missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths::GoalpostPaths;
use crate::vocab::TierWeights;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Persistent user settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Goals repository root, used when neither `--repo` nor
    /// `GOALPOST_REPO` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<PathBuf>,
    /// Default size of a vocabulary practice set.
    #[serde(default = "default_practice_count")]
    pub practice_count: usize,
    /// Mastery snapshot location; defaults to the XDG cache directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastery_cache: Option<PathBuf>,
    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Practice tier weights. Kept last: TOML tables follow plain keys.
    #[serde(default)]
    pub weights: TierWeights,
}

fn default_practice_count() -> usize {
    20
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repo_path: None,
            practice_count: default_practice_count(),
            mastery_cache: None,
            log_level: default_log_level(),
            weights: TierWeights::default(),
        }
    }
}

impl Settings {
    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// The settings as TOML text.
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: "goalpost.toml".into(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file, creating the parent directory.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Set one plain key from its command-line text.
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let invalid = || ConfigError::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "repo_path" => self.repo_path = Some(PathBuf::from(value)),
            "mastery_cache" => self.mastery_cache = Some(PathBuf::from(value)),
            "practice_count" => self.practice_count = value.trim().parse().map_err(|_| invalid())?,
            "log_level" if !value.trim().is_empty() => self.log_level = value.trim().to_string(),
            _ => return Err(invalid()),
        }
        Ok(())
    }

    /// Validated, normalised tier weights.
    pub fn tier_weights(&self) -> ConfigResult<TierWeights> {
        self.weights.normalized()
    }

    pub fn mastery_cache_file(&self, paths: &GoalpostPaths) -> PathBuf {
        self.mastery_cache
            .clone()
            .unwrap_or_else(|| paths.mastery_cache_file())
    }
}
