//! Work-queue sink backed by the `queue_messages` SQLite table.
//!
//! # Invariants
//! - One row per accepted publish, keyed by a fresh `message_id`.
//! - Bodies above `MAX_QUEUE_MESSAGE_BYTES` are rejected before any write.

use super::{EventSink, PublishReceipt, SinkError, SinkKind};
use crate::db::{open_db_in_memory, open_db_with_timeout, DbResult};
use crate::model::event::RecordEvent;
use chrono::{SecondsFormat, Utc};
use log::debug;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

/// Largest accepted message body, in bytes.
pub const MAX_QUEUE_MESSAGE_BYTES: usize = 256 * 1024;

/// Stored queue message as seen by a consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub seq: i64,
    pub message_id: String,
    pub queue_name: String,
    pub body: String,
    pub enqueued_at: String,
}

pub struct SqliteQueueSink {
    queue_name: String,
    conn: Mutex<Connection>,
}

impl SqliteQueueSink {
    /// Opens (and migrates) the queue database at `path`.
    pub fn open(
        path: impl AsRef<Path>,
        queue_name: impl Into<String>,
        busy_timeout: Duration,
    ) -> DbResult<Self> {
        let conn = open_db_with_timeout(path, busy_timeout)?;
        Ok(Self::from_connection(conn, queue_name))
    }

    pub fn open_in_memory(queue_name: impl Into<String>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?, queue_name))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection, queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            conn: Mutex::new(conn),
        }
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Returns up to `limit` stored messages for this queue, oldest first.
    pub fn pending_messages(&self, limit: u32) -> Result<Vec<QueuedMessage>, SinkError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT seq, message_id, queue_name, body, enqueued_at
             FROM queue_messages
             WHERE queue_name = ?1
             ORDER BY seq ASC
             LIMIT ?2;",
        )?;
        let rows = stmt.query_map(params![self.queue_name, i64::from(limit)], |row| {
            Ok(QueuedMessage {
                seq: row.get("seq")?,
                message_id: row.get("message_id")?,
                queue_name: row.get("queue_name")?,
                body: row.get("body")?,
                enqueued_at: row.get("enqueued_at")?,
            })
        })?;
        let mut messages = Vec::new();
        for message in rows {
            messages.push(message?);
        }
        Ok(messages)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SinkError> {
        self.conn
            .lock()
            .map_err(|err| SinkError::Unavailable(format!("queue connection lock: {err}")))
    }
}

impl EventSink for SqliteQueueSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Queue
    }

    fn publish(&self, event: &RecordEvent) -> Result<PublishReceipt, SinkError> {
        let body = event.to_json()?;
        if body.len() > MAX_QUEUE_MESSAGE_BYTES {
            return Err(SinkError::PayloadTooLarge {
                size: body.len(),
                limit: MAX_QUEUE_MESSAGE_BYTES,
            });
        }

        let message_id = Uuid::new_v4().to_string();
        let enqueued_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO queue_messages (message_id, queue_name, body, enqueued_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![message_id, self.queue_name, body, enqueued_at],
        )?;
        debug!(
            "event=queue_enqueue module=sink status=ok queue={} message_id={} bytes={}",
            self.queue_name,
            message_id,
            body.len()
        );

        Ok(PublishReceipt {
            sink: SinkKind::Queue,
            message_id,
        })
    }
}
