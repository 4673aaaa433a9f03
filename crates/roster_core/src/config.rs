//! Runtime configuration for roster binaries.
//!
//! # Responsibility
//! - Parse `roster.toml` into a typed config.
//! - Apply `ROSTER_*` environment overrides on top of the file values.
//!
//! # Invariants
//! - A validated config has `default_page_size > 0`.
//! - `log_dir`, when present, is absolute (the logger rejects relative dirs).

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "ROSTER_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ROSTER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ROSTER_LOG_DIR";
pub const ENV_PAGE_SIZE: &str = "ROSTER_PAGE_SIZE";

const DEFAULT_PAGE_SIZE: i64 = 20;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Settings shared by the CLI and embedding applications.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    /// Database file; `None` means a throwaway in-memory database.
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    /// File logging is enabled only when this is set.
    pub log_dir: Option<PathBuf>,
    pub default_page_size: i64,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RosterConfig {
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Overrides fields from `ROSTER_*` variables of the process environment.
    pub fn with_process_env(self) -> ConfigResult<Self> {
        self.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Overrides fields from `lookup`, then re-validates.
    ///
    /// Blank values are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = read(ENV_DB_PATH) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(size) = read(ENV_PAGE_SIZE) {
            self.default_page_size = size.parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_PAGE_SIZE} must be an integer, got `{size}`"))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_page_size <= 0 {
            return Err(ConfigError::Invalid(format!(
                "default_page_size must be > 0, got {}",
                self.default_page_size
            )));
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
