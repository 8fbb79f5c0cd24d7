//! Application configuration.
//!
//! Loaded in three layers, later layers winning:
//! 1. Built-in defaults
//! 2. A TOML file (`appointments.toml`, or the path in `APPOINTMENTS_CONFIG`)
//! 3. Environment overrides
//!
//! # Environment Variables
//! - `APPOINTMENTS_CONFIG` (optional): path to the TOML file
//! - `APPOINTMENTS_DB` (optional): overrides `database_path`
//! - `APPOINTMENTS_LOG` (optional): overrides `log_filter`
//!
//! # File Format
//!
//! ```toml
//! database_path = "appointments.db"
//! providers = ["Dr. A", "Dr. B"]
//! default_duration_minutes = 30
//! min_duration_minutes = 15
//! max_duration_minutes = 120
//! duration_step_minutes = 15
//! log_filter = "u_appointment=info"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationRules;

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "appointments.toml";

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but cannot be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`Config`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Values are individually well-formed but inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Providers that may be booked. Empty = any.
    pub providers: Vec<String>,
    /// Duration used when none is given (minutes).
    pub default_duration_minutes: i64,
    /// Shortest bookable duration (minutes).
    pub min_duration_minutes: i64,
    /// Longest bookable duration (minutes).
    pub max_duration_minutes: i64,
    /// Bookable durations come in multiples of this (minutes).
    pub duration_step_minutes: Option<i64>,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("appointments.db"),
            providers: vec!["Dr. A".to_string(), "Dr. B".to_string()],
            default_duration_minutes: 30,
            min_duration_minutes: 15,
            max_duration_minutes: 120,
            duration_step_minutes: Some(15),
            log_filter: "u_appointment=info".to_string(),
        }
    }
}

impl Config {
    /// Parses configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.check()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Loads the full layered configuration.
    ///
    /// A missing file is not an error when no path was set explicitly;
    /// defaults are used instead.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var_os("APPOINTMENTS_CONFIG") {
            Some(path) => Self::from_file(PathBuf::from(path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.check()?;
        Ok(config)
    }

    /// Applies environment-style overrides from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup("APPOINTMENTS_DB").filter(|s| !s.is_empty()) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(filter) = lookup("APPOINTMENTS_LOG").filter(|s| !s.is_empty()) {
            self.log_filter = filter;
        }
    }

    /// Validation rules derived from this configuration.
    pub fn validation_rules(&self) -> ValidationRules {
        let rules = ValidationRules::default()
            .with_providers(self.providers.iter().cloned())
            .with_duration_range(self.min_duration_minutes, self.max_duration_minutes);
        match self.duration_step_minutes {
            Some(step) => rules.with_duration_step(step),
            None => rules,
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.min_duration_minutes <= 0 {
            return Err(ConfigError::Invalid(format!(
                "min_duration_minutes must be positive, got {}",
                self.min_duration_minutes
            )));
        }
        if self.min_duration_minutes > self.max_duration_minutes {
            return Err(ConfigError::Invalid(format!(
                "min_duration_minutes ({}) exceeds max_duration_minutes ({})",
                self.min_duration_minutes, self.max_duration_minutes
            )));
        }
        if !(self.min_duration_minutes..=self.max_duration_minutes)
            .contains(&self.default_duration_minutes)
        {
            return Err(ConfigError::Invalid(format!(
                "default_duration_minutes ({}) is outside [{}, {}]",
                self.default_duration_minutes, self.min_duration_minutes, self.max_duration_minutes
            )));
        }
        if let Some(step) = self.duration_step_minutes {
            if step <= 0 {
                return Err(ConfigError::Invalid(format!(
                    "duration_step_minutes must be positive, got {step}"
                )));
            }
            if self.default_duration_minutes % step != 0 {
                return Err(ConfigError::Invalid(format!(
                    "default_duration_minutes ({}) is not a multiple of duration_step_minutes ({step})",
                    self.default_duration_minutes
                )));
            }
        }
        Ok(())
    }
}
