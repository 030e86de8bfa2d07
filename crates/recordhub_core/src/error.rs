//! Caller-visible error taxonomy.
//!
//! # Responsibility
//! - Classify every failure an operation can surface with a stable kind tag.
//! - Carry the record id or operation name for correlation.
//!
//! # Invariants
//! - Validation and routing errors are produced before any external call.
//! - `SinkPublishFailed` is a kind tag for logs and reports only; it is never
//!   the error of an operation result.

use crate::model::record::{RecordId, RecordValidationError};
use crate::repo::record_repo::StoreError;
use crate::sink::{SinkError, SinkKind};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable error kind tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ValidationError,
    StoreWriteFailed,
    StoreReadFailed,
    SinkPublishFailed,
    UnknownOperation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "ValidationError",
            Self::StoreWriteFailed => "StoreWriteFailed",
            Self::StoreReadFailed => "StoreReadFailed",
            Self::SinkPublishFailed => "SinkPublishFailed",
            Self::UnknownOperation => "UnknownOperation",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a caller-supplied field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    Missing,
    NotAString,
    Blank,
    InvalidJson,
}

/// Rejected caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: ValidationReason) -> Self {
        Self { field, reason }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let field = self.field;
        match self.reason {
            ValidationReason::Missing => write!(f, "missing required argument `{field}`"),
            ValidationReason::NotAString => write!(f, "argument `{field}` must be a string"),
            ValidationReason::Blank => write!(f, "argument `{field}` must not be empty"),
            ValidationReason::InvalidJson => write!(f, "`{field}` is not valid JSON"),
        }
    }
}

impl Error for ValidationError {}

impl From<RecordValidationError> for ValidationError {
    fn from(value: RecordValidationError) -> Self {
        Self::new(value.field(), ValidationReason::Blank)
    }
}

/// Failure of one operation, as returned to the caller.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    StoreWriteFailed {
        record_id: RecordId,
        source: StoreError,
    },
    StoreReadFailed {
        record_id: Option<RecordId>,
        source: StoreError,
    },
    UnknownOperation(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::StoreWriteFailed { .. } => ErrorKind::StoreWriteFailed,
            Self::StoreReadFailed { .. } => ErrorKind::StoreReadFailed,
            Self::UnknownOperation(_) => ErrorKind::UnknownOperation,
        }
    }

    /// Record the failure is about, when one is known.
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Self::StoreWriteFailed { record_id, .. } => Some(*record_id),
            Self::StoreReadFailed { record_id, .. } => *record_id,
            Self::Validation(_) | Self::UnknownOperation(_) => None,
        }
    }

    /// Structured payload for transports.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error_type: self.kind().as_str(),
            message: self.to_string(),
            record_id: self.record_id().map(|id| id.to_string()),
            operation: match self {
                Self::UnknownOperation(name) => Some(name.clone()),
                _ => None,
            },
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::StoreWriteFailed { record_id, source } => {
                write!(f, "failed to persist record {record_id}: {source}")
            }
            Self::StoreReadFailed {
                record_id: Some(record_id),
                source,
            } => write!(f, "failed to read record {record_id}: {source}"),
            Self::StoreReadFailed {
                record_id: None,
                source,
            } => write!(f, "failed to read records: {source}"),
            Self::UnknownOperation(name) => write!(f, "unknown operation: `{name}`"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StoreWriteFailed { source, .. } | Self::StoreReadFailed { source, .. } => {
                Some(source)
            }
            Self::UnknownOperation(_) => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RecordValidationError> for ServiceError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value.into())
    }
}

/// JSON error body: stable kind tag plus correlation fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_type: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// Non-fatal publish failure observed by the orchestrator.
#[derive(Debug)]
pub struct SinkFailure {
    pub sink: SinkKind,
    pub record_id: RecordId,
    pub error: SinkError,
}

impl SinkFailure {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::SinkPublishFailed
    }
}

impl Display for SinkFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} publish failed for record {}: {}",
            self.sink, self.record_id, self.error
        )
    }
}

impl Error for SinkFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}
