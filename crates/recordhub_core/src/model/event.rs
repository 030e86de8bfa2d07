//! Event envelope mirrored to queue and topic sinks.

use crate::model::record::Record;
use serde::{Deserialize, Serialize};

/// Kind of lifecycle event carried by a [`RecordEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    RecordCreated,
}

/// `{eventType, record}` envelope published after a successful store write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEvent {
    pub event_type: EventType,
    pub record: Record,
}

impl RecordEvent {
    pub fn created(record: Record) -> Self {
        Self {
            event_type: EventType::RecordCreated,
            record,
        }
    }

    /// Serializes the envelope to its JSON text form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::RecordEvent;
    use crate::model::record::{NewRecord, Record};

    #[test]
    fn envelope_uses_record_created_tag() {
        let record = Record::create(NewRecord::new("t", "c")).unwrap();
        let json = RecordEvent::created(record.clone()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["eventType"], "RECORD_CREATED");
        assert_eq!(value["record"]["id"], record.id.to_string());
    }
}
