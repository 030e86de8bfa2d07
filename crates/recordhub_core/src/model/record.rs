//! Record domain model and factory.
//!
//! # Responsibility
//! - Define the canonical record persisted by the store.
//! - Construct new records from caller input (`Record::create`).
//!
//! # Invariants
//! - `id` is generated by `Record::create` and never supplied by callers.
//! - `created_at` is fixed at creation with millisecond precision.
//! - `processed` starts as `false`.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a record.
pub type RecordId = Uuid;

/// Validation failures for caller-supplied record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordValidationError {
    EmptyTitle,
    EmptyContent,
}

impl RecordValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "title",
            Self::EmptyContent => "content",
        }
    }
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` must not be empty", self.field())
    }
}

impl Error for RecordValidationError {}

/// Caller input for record creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub title: String,
    pub content: String,
}

impl NewRecord {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Rejects blank title or content.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.title.trim().is_empty() {
            return Err(RecordValidationError::EmptyTitle);
        }
        if self.content.trim().is_empty() {
            return Err(RecordValidationError::EmptyContent);
        }
        Ok(())
    }
}

/// Canonical persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub content: String,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    /// Flipped by downstream consumers of the created event.
    pub processed: bool,
}

impl Record {
    /// Builds a new record from validated caller input.
    ///
    /// Pure construction: no I/O, safe to call from any thread.
    pub fn create(input: NewRecord) -> Result<Self, RecordValidationError> {
        input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            created_at: Utc::now().trunc_subsecs(3),
            processed: false,
        })
    }

    /// Restores a record from already-persisted parts.
    ///
    /// Used by store read paths; performs no validation.
    pub fn with_parts(
        id: RecordId,
        title: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
        processed: bool,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            created_at,
            processed,
        }
    }

    /// `created_at` in the RFC 3339 text form used for storage and events.
    pub fn created_at_text(&self) -> String {
        rfc3339_millis::format(&self.created_at)
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
pub(crate) mod rfc3339_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value).map(|parsed| parsed.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }
}
