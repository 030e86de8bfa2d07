//! Notification-topic sink writing JSON lines to a topic file.
//!
//! Each publish hands one complete [`TopicLine`] to a single unbuffered
//! append. A failed write is reported and never retried by a later publish.

use super::{EventSink, PublishReceipt, SinkError, SinkKind};
use crate::model::event::RecordEvent;
use chrono::{SecondsFormat, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

/// One delivered topic notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicLine {
    pub topic: String,
    pub message_id: String,
    pub published_at: String,
    /// Serialized event envelope; topics carry text.
    pub message: String,
}

pub struct JsonlTopicSink {
    topic_name: String,
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlTopicSink {
    /// Opens the topic file for appending, creating parent directories.
    pub fn open(path: impl AsRef<Path>, topic_name: impl Into<String>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            topic_name: topic_name.into(),
            path,
            file: Mutex::new(file),
        })
    }

    pub fn topic_name(&self) -> &str {
        &self.topic_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonlTopicSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Topic
    }

    fn publish(&self, event: &RecordEvent) -> Result<PublishReceipt, SinkError> {
        let line = TopicLine {
            topic: self.topic_name.clone(),
            message_id: Uuid::new_v4().to_string(),
            published_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message: event.to_json()?,
        };

        let mut text = serde_json::to_string(&line)?;
        text.push('\n');

        let mut file = self
            .file
            .lock()
            .map_err(|err| SinkError::Unavailable(format!("topic file lock: {err}")))?;
        file.write_all(text.as_bytes())?;
        debug!(
            "event=topic_publish module=sink status=ok topic={} message_id={}",
            self.topic_name, line.message_id
        );

        Ok(PublishReceipt {
            sink: SinkKind::Topic,
            message_id: line.message_id,
        })
    }
}
