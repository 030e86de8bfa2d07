//! Best-effort event sinks for record lifecycle events.
//!
//! # Responsibility
//! - Define the publish contract shared by the work-queue and topic sinks.
//! - Provide the SQLite work-queue and JSON-lines topic implementations.
//!
//! # Invariants
//! - Sinks are `Send + Sync`; any handle they own is guarded internally.
//! - A publish failure is reported to the caller of `publish`, never retried
//!   by the sink itself.

use crate::db::DbError;
use crate::model::event::RecordEvent;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod queue;
pub mod topic;

pub use queue::{QueuedMessage, SqliteQueueSink, MAX_QUEUE_MESSAGE_BYTES};
pub use topic::{JsonlTopicSink, TopicLine};

/// Which downstream system a sink delivers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Queue,
    Topic,
}

impl SinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queue => "queue",
            Self::Topic => "topic",
        }
    }
}

impl Display for SinkKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acknowledgement for one accepted publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub sink: SinkKind,
    pub message_id: String,
}

/// Failure delivering one event to one sink.
#[derive(Debug)]
pub enum SinkError {
    Serialize(serde_json::Error),
    Db(DbError),
    Io(std::io::Error),
    PayloadTooLarge { size: usize, limit: usize },
    Unavailable(String),
}

impl Display for SinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize event: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::PayloadTooLarge { size, limit } => {
                write!(f, "event payload is {size} bytes, limit is {limit}")
            }
            Self::Unavailable(message) => write!(f, "sink unavailable: {message}"),
        }
    }
}

impl Error for SinkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::PayloadTooLarge { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

impl From<DbError> for SinkError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SinkError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for SinkError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Downstream delivery target for record events.
pub trait EventSink: Send + Sync {
    fn kind(&self) -> SinkKind;

    /// Delivers one event. Called at most once per event by the orchestrator.
    fn publish(&self, event: &RecordEvent) -> Result<PublishReceipt, SinkError>;
}
