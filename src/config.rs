//! Session configuration.
//!
//! Settings are read from a `.mockingbird.toml` file found in the working
//! directory or one of its ancestors, then overridden from the environment:
//!
//! ```toml
//! # .mockingbird.toml
//! report_limit = 5          # recorded calls listed in verification failures
//! trace_invocations = true  # emit a trace event for every intercepted call
//! ```
//!
//! | variable                   | field               |
//! |----------------------------|---------------------|
//! | `MOCKINGBIRD_TRACE`        | `trace_invocations` |
//! | `MOCKINGBIRD_REPORT_LIMIT` | `report_limit`      |

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".mockingbird.toml";

/// Ancestors searched by [`SessionConfig::discover`].
const MAX_DISCOVERY_DEPTH: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Recorded invocations listed in a verification failure.
    #[serde(default = "default_report_limit")]
    pub report_limit: usize,

    #[serde(default)]
    pub trace_invocations: bool,
}

fn default_report_limit() -> usize {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            report_limit: default_report_limit(),
            trace_invocations: false,
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!("Loaded session config from {}", path.display());
        Ok(config)
    }

    /// Look for a config file in `start` and its ancestors.
    ///
    /// Unreadable or invalid files are logged and skipped.
    pub fn discover(start: &Path) -> Option<Self> {
        start
            .ancestors()
            .take(MAX_DISCOVERY_DEPTH)
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .filter(|candidate| candidate.is_file())
            .find_map(|candidate| match Self::load(&candidate) {
                Ok(config) => Some(config),
                Err(e) => {
                    log::warn!("Ignoring {}: {}", candidate.display(), e);
                    None
                }
            })
    }

    /// Apply `MOCKINGBIRD_*` overrides from the process environment.
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("MOCKINGBIRD_TRACE") {
            self.trace_invocations = matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(raw) = lookup("MOCKINGBIRD_REPORT_LIMIT") {
            match raw.parse() {
                Ok(limit) => self.report_limit = limit,
                Err(_) => log::warn!("MOCKINGBIRD_REPORT_LIMIT={raw} is not a number, keeping {}", self.report_limit),
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report_limit == 0 {
            return Err(ConfigError::Invalid(
                "report_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Discover from the current directory, then apply the environment.
    pub fn from_environment() -> Result<Self, ConfigError> {
        let discovered = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::discover(&dir))
            .unwrap_or_default();
        let config = discovered.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
