//! Process configuration for the record service.
//!
//! # Responsibility
//! - Describe where the record store lives and which sinks are enabled.
//! - Load that description once, from environment variables or TOML.
//!
//! # Invariants
//! - An unset or blank sink address disables that sink; it is not an error.
//! - The store path is always required.

use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_STORE_PATH: &str = "RECORDHUB_STORE_PATH";
pub const ENV_QUEUE_PATH: &str = "RECORDHUB_QUEUE_PATH";
pub const ENV_QUEUE_NAME: &str = "RECORDHUB_QUEUE_NAME";
pub const ENV_TOPIC_PATH: &str = "RECORDHUB_TOPIC_PATH";
pub const ENV_TOPIC_NAME: &str = "RECORDHUB_TOPIC_NAME";
pub const ENV_BUSY_TIMEOUT_MS: &str = "RECORDHUB_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "RECORDHUB_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "RECORDHUB_LOG_DIR";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, message: String },
    Read(std::io::Error),
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required setting `{key}`"),
            Self::Invalid { key, message } => write!(f, "invalid setting `{key}`: {message}"),
            Self::Read(err) => write!(f, "failed to read config file: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Missing(_) | Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Read(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Work-queue sink address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSinkConfig {
    /// SQLite database holding `queue_messages`.
    pub path: PathBuf,
    #[serde(default = "default_queue_name")]
    pub queue_name: String,
}

/// Notification-topic sink address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSinkConfig {
    /// JSON-lines file the topic is appended to.
    pub path: PathBuf,
    #[serde(default = "default_topic_name")]
    pub topic_name: String,
}

/// Settings read once at process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub store_path: PathBuf,
    #[serde(default)]
    pub queue: Option<QueueSinkConfig>,
    #[serde(default)]
    pub topic: Option<TopicSinkConfig>,
    /// Upper bound for one blocked store or queue call.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_log_level_string")]
    pub log_level: String,
    /// Rolling log file directory; stderr logging when absent.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_queue_name() -> String {
    "record-created".to_string()
}

fn default_topic_name() -> String {
    "record-events".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn default_log_level_string() -> String {
    default_log_level().to_string()
}

impl ServiceConfig {
    /// Config with only a store and default settings.
    pub fn for_store(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            queue: None,
            topic: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_level: default_log_level_string(),
            log_dir: None,
        }
    }

    /// Loads from `RECORDHUB_*` process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads from any key lookup using the `RECORDHUB_*` names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let store_path = read(ENV_STORE_PATH)
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing(ENV_STORE_PATH))?;
        let queue = read(ENV_QUEUE_PATH).map(|path| QueueSinkConfig {
            path: PathBuf::from(path),
            queue_name: read(ENV_QUEUE_NAME).unwrap_or_else(default_queue_name),
        });
        let topic = read(ENV_TOPIC_PATH).map(|path| TopicSinkConfig {
            path: PathBuf::from(path),
            topic_name: read(ENV_TOPIC_NAME).unwrap_or_else(default_topic_name),
        });
        let busy_timeout_ms = match read(ENV_BUSY_TIMEOUT_MS) {
            Some(raw) => raw.parse::<u64>().map_err(|err| ConfigError::Invalid {
                key: ENV_BUSY_TIMEOUT_MS,
                message: err.to_string(),
            })?,
            None => DEFAULT_BUSY_TIMEOUT_MS,
        };

        let config = Self {
            store_path,
            queue,
            topic,
            busy_timeout_ms,
            log_level: read(ENV_LOG_LEVEL).unwrap_or_else(default_log_level_string),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        };
        config.validated()
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validated()
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::Missing("store_path"));
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "busy_timeout_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        self.log_level = normalize_level(&self.log_level)
            .map_err(|message| ConfigError::Invalid {
                key: "log_level",
                message,
            })?
            .to_string();

        if self
            .queue
            .as_ref()
            .is_some_and(|queue| queue.path.as_os_str().is_empty())
        {
            self.queue = None;
        }
        if self
            .topic
            .as_ref()
            .is_some_and(|topic| topic.path.as_os_str().is_empty())
        {
            self.topic = None;
        }
        Ok(self)
    }
}
