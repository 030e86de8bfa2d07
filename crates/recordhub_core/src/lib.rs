//! Core domain logic for recordhub.
//! The record store is the single source of truth; sinks receive derived
//! copies of record lifecycle events.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sink;

pub use api::router::{dispatch, dispatch_invocation, Invocation, Operation, OperationOutput};
pub use config::{ConfigError, QueueSinkConfig, ServiceConfig, TopicSinkConfig};
pub use error::{
    ErrorKind, ErrorResponse, ServiceError, SinkFailure, ValidationError, ValidationReason,
};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::event::{EventType, RecordEvent};
pub use model::record::{NewRecord, Record, RecordId, RecordValidationError};
pub use repo::record_repo::{RecordStore, SqliteRecordStore, StoreError, StoreResult};
pub use service::record_service::{CreateReport, EventSinks, RecordService, SinkOutcome};
pub use sink::{
    EventSink, JsonlTopicSink, PublishReceipt, SinkError, SinkKind, SqliteQueueSink,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
