//! Process configuration read from the environment.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "SAFEDEL_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "SAFEDEL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SAFEDEL_LOG_DIR";

/// Settings a host needs to open the store and start logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// `None` opens an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: &'static str,
    /// `None` leaves file logging off.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
    EmptyValue(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(value) => {
                write!(f, "{ENV_LOG_LEVEL} has unsupported value `{value}`")
            }
            Self::RelativeLogDir(path) => write!(
                f,
                "{ENV_LOG_DIR} must be an absolute path, got `{}`",
                path.display()
            ),
            Self::EmptyValue(name) => write!(f, "{name} is set but empty"),
        }
    }
}

impl Error for ConfigError {}

impl CoreConfig {
    /// Reads `SAFEDEL_DB_PATH`, `SAFEDEL_LOG_LEVEL` and `SAFEDEL_LOG_DIR`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(non_empty(ENV_DB_PATH, &value)?));
        }

        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(non_empty(ENV_LOG_LEVEL, &value)?)
                .map_err(|_| ConfigError::InvalidLogLevel(value.trim().to_string()))?;
        }

        if let Some(value) = lookup(ENV_LOG_DIR) {
            let dir = PathBuf::from(non_empty(ENV_LOG_DIR, &value)?);
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir));
            }
            config.log_dir = Some(dir);
        }

        Ok(config)
    }
}

fn non_empty<'a>(name: &'static str, value: &'a str) -> Result<&'a str, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ConfigError::EmptyValue(name))
    } else {
        Ok(trimmed)
    }
}
