//! Operation router over a closed set of operation names.
//!
//! # Invariants
//! - Unknown names fail with `UnknownOperation` carrying the name.
//! - Argument errors are `ValidationError` and never reach the store.
//! - Routing is stateless; all state lives behind the service.

use crate::error::{ServiceError, ValidationError, ValidationReason};
use crate::model::record::{NewRecord, Record, RecordId};
use crate::repo::record_repo::RecordStore;
use crate::service::record_service::RecordService;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Supported operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateRecord,
    ListRecords,
    GetRecord,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Self::CreateRecord, Self::ListRecords, Self::GetRecord];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRecord => "createRecord",
            Self::ListRecords => "listRecords",
            Self::GetRecord => "getRecord",
        }
    }

    /// Resolves an operation name; matching is exact.
    pub fn parse(name: &str) -> Result<Self, ServiceError> {
        Self::ALL
            .into_iter()
            .find(|operation| operation.name() == name)
            .ok_or_else(|| ServiceError::UnknownOperation(name.to_string()))
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One inbound call: operation name plus arguments object.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub operation_name: String,
    pub arguments: Value,
}

impl Invocation {
    pub fn new(operation_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            operation_name: operation_name.into(),
            arguments,
        }
    }

    /// Reads a resolver-style event: `info.fieldName` or top-level
    /// `fieldName`, plus `arguments` (absent means no arguments).
    ///
    /// A missing field name becomes an empty operation name, which the
    /// router rejects as unknown.
    pub fn from_event(event: &Value) -> Self {
        let operation_name = event
            .pointer("/info/fieldName")
            .and_then(Value::as_str)
            .or_else(|| event.get("fieldName").and_then(Value::as_str))
            .unwrap_or_default();
        let arguments = event
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        Self::new(operation_name, arguments)
    }

    /// Builds an invocation from arguments given as JSON text.
    ///
    /// # Errors
    /// - `Validation` on field `arguments` when the text is not valid JSON.
    pub fn from_arguments_text(
        operation_name: impl Into<String>,
        arguments: &str,
    ) -> Result<Self, ServiceError> {
        let arguments = serde_json::from_str(arguments)
            .map_err(|_| ValidationError::new("arguments", ValidationReason::InvalidJson))?;
        Ok(Self::new(operation_name, arguments))
    }
}

/// Result of a dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutput {
    Record(Record),
    Records(Vec<Record>),
    MaybeRecord(Option<Record>),
}

impl OperationOutput {
    /// JSON form: object, array, or `null` for an absent record.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        match self {
            Self::Record(record) => serde_json::to_value(record),
            Self::Records(records) => serde_json::to_value(records),
            Self::MaybeRecord(record) => serde_json::to_value(record),
        }
    }
}

/// Routes one invocation to the service.
pub fn dispatch<S: RecordStore>(
    service: &RecordService<S>,
    operation_name: &str,
    arguments: &Value,
) -> Result<OperationOutput, ServiceError> {
    match Operation::parse(operation_name)? {
        Operation::CreateRecord => {
            let input = NewRecord::new(
                required_string(arguments, "title")?,
                required_string(arguments, "content")?,
            );
            service.create_record(input).map(OperationOutput::Record)
        }
        Operation::ListRecords => service.list_records().map(OperationOutput::Records),
        Operation::GetRecord => match stored_record_id(arguments, "id")? {
            Some(id) => service.get_record(id).map(OperationOutput::MaybeRecord),
            None => Ok(OperationOutput::MaybeRecord(None)),
        },
    }
}

/// Routes a parsed [`Invocation`].
pub fn dispatch_invocation<S: RecordStore>(
    service: &RecordService<S>,
    invocation: &Invocation,
) -> Result<OperationOutput, ServiceError> {
    dispatch(service, &invocation.operation_name, &invocation.arguments)
}

fn required_string(arguments: &Value, field: &'static str) -> Result<String, ValidationError> {
    match arguments.get(field) {
        None | Some(Value::Null) => Err(ValidationError::new(field, ValidationReason::Missing)),
        Some(Value::String(value)) if value.trim().is_empty() => {
            Err(ValidationError::new(field, ValidationReason::Blank))
        }
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(ValidationError::new(field, ValidationReason::NotAString)),
    }
}

/// Resolves an opaque id argument to a stored key.
///
/// Only the exact text the store writes (lowercase hyphenated UUID) can match
/// a record; any other non-blank string is a key nothing was stored under.
fn stored_record_id(
    arguments: &Value,
    field: &'static str,
) -> Result<Option<RecordId>, ValidationError> {
    let text = required_string(arguments, field)?;
    Ok(Uuid::try_parse(&text).ok().filter(|id| id.to_string() == text))
}
