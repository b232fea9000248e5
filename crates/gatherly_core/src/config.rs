//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve database path and logging settings from the environment.
//!
//! # Invariants
//! - `log_level` is always a canonical level string.
//! - `log_dir`, when set, is absolute.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "GATHERLY_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "GATHERLY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "GATHERLY_LOG_DIR";

const DEFAULT_DB_PATH: &str = "gatherly.db";

/// Core runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let db_path = read(ENV_DB_PATH)
            .map(|value| PathBuf::from(value.trim()))
            .unwrap_or(defaults.db_path);
        let log_level = match read(ENV_LOG_LEVEL) {
            Some(value) => normalize_level(&value).map_err(|source| ConfigError::Invalid {
                key: ENV_LOG_LEVEL,
                source,
            })?,
            None => defaults.log_level,
        };
        let log_dir = read(ENV_LOG_DIR)
            .map(|value| normalize_log_dir(&value))
            .transpose()
            .map_err(|source| ConfigError::Invalid {
                key: ENV_LOG_DIR,
                source,
            })?;

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}

/// Configuration resolution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid {
        key: &'static str,
        source: LoggingError,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { key, source } => write!(f, "invalid `{key}`: {source}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid { source, .. } => Some(source),
        }
    }
}
