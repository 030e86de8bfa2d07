//! Record use-case service: write orchestration and read gateway.
//!
//! # Responsibility
//! - Sequence `createRecord` across the store and the optional sinks.
//! - Classify failures into fatal (store) and advisory (sink) outcomes.
//! - Pass reads through to the store.
//!
//! # Invariants
//! - The store write completes before any sink publish starts.
//! - A failed store write means no sink is called.
//! - Sink outcomes never change the result of `create_record`.
//! - Nothing is retried here; each external call is made at most once.
//! - A sink that panics is contained like any other sink failure.

use crate::error::{ServiceError, SinkFailure};
use crate::model::event::RecordEvent;
use crate::model::record::{NewRecord, Record, RecordId};
use crate::repo::record_repo::RecordStore;
use crate::sink::{EventSink, PublishReceipt, SinkError};
use log::{error, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Optional downstream sinks. An absent sink is skipped without error.
#[derive(Clone, Default)]
pub struct EventSinks {
    pub queue: Option<Arc<dyn EventSink>>,
    pub topic: Option<Arc<dyn EventSink>>,
}

impl EventSinks {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(queue: Option<Arc<dyn EventSink>>, topic: Option<Arc<dyn EventSink>>) -> Self {
        Self { queue, topic }
    }

    pub fn with_queue(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.queue = Some(sink);
        self
    }

    pub fn with_topic(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.topic = Some(sink);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_none() && self.topic.is_none()
    }
}

/// What happened to one sink during a create.
#[derive(Debug)]
pub enum SinkOutcome {
    /// Sink not configured.
    Skipped,
    Published(PublishReceipt),
    Failed(SinkFailure),
}

impl SinkOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Published(_) => "published",
            Self::Failed(_) => "failed",
        }
    }
}

/// Persisted record plus per-sink delivery outcome.
#[derive(Debug)]
pub struct CreateReport {
    pub record: Record,
    pub queue: SinkOutcome,
    pub topic: SinkOutcome,
}

/// Record service over a store implementation and optional sinks.
pub struct RecordService<S: RecordStore> {
    store: S,
    sinks: EventSinks,
}

impl<S: RecordStore> RecordService<S> {
    /// Creates a service with no sinks configured.
    pub fn new(store: S) -> Self {
        Self::with_sinks(store, EventSinks::none())
    }

    pub fn with_sinks(store: S, sinks: EventSinks) -> Self {
        Self { store, sinks }
    }

    /// Creates, persists, and announces one record.
    ///
    /// Succeeds once the store write succeeds; sink failures are logged only.
    pub fn create_record(&self, input: NewRecord) -> Result<Record, ServiceError> {
        self.create_record_with_report(input).map(|report| report.record)
    }

    /// Same as [`Self::create_record`], also reporting each sink outcome.
    ///
    /// # Errors
    /// - `Validation` when title or content is blank; nothing is written.
    /// - `StoreWriteFailed` when the upsert fails; no sink is called.
    pub fn create_record_with_report(
        &self,
        input: NewRecord,
    ) -> Result<CreateReport, ServiceError> {
        let started_at = Instant::now();
        let record = match Record::create(input) {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    "event=record_create module=service status=rejected error_code=ValidationError field={}",
                    err.field()
                );
                return Err(err.into());
            }
        };

        if let Err(source) = self.store.put_record(&record) {
            error!(
                "event=record_create module=service status=error stage=store_write record_id={} duration_ms={} error_code=StoreWriteFailed error={}",
                record.id,
                started_at.elapsed().as_millis(),
                source
            );
            return Err(ServiceError::StoreWriteFailed {
                record_id: record.id,
                source,
            });
        }

        let event = RecordEvent::created(record.clone());
        let (queue, topic) = self.publish_all(&event);

        info!(
            "event=record_create module=service status=ok record_id={} queue={} topic={} duration_ms={}",
            record.id,
            queue.label(),
            topic.label(),
            started_at.elapsed().as_millis()
        );

        Ok(CreateReport {
            record,
            queue,
            topic,
        })
    }

    /// Gets one record by id. Absence is `Ok(None)`.
    pub fn get_record(&self, id: RecordId) -> Result<Option<Record>, ServiceError> {
        self.store.get_record(id).map_err(|source| {
            error!(
                "event=record_get module=service status=error record_id={} error_code=StoreReadFailed error={}",
                id, source
            );
            ServiceError::StoreReadFailed {
                record_id: Some(id),
                source,
            }
        })
    }

    /// Lists every stored record; empty store yields an empty vec.
    pub fn list_records(&self) -> Result<Vec<Record>, ServiceError> {
        self.store.list_records().map_err(|source| {
            error!(
                "event=record_list module=service status=error error_code=StoreReadFailed error={}",
                source
            );
            ServiceError::StoreReadFailed {
                record_id: None,
                source,
            }
        })
    }

    fn publish_all(&self, event: &RecordEvent) -> (SinkOutcome, SinkOutcome) {
        match (self.sinks.queue.as_deref(), self.sinks.topic.as_deref()) {
            (Some(queue), Some(topic)) => thread::scope(|scope| {
                let queue_handle = scope.spawn(|| guarded_publish(queue, event));
                let topic_outcome = guarded_publish(topic, event);
                let queue_outcome = queue_handle
                    .join()
                    .unwrap_or_else(|_| panicked_outcome(queue, event));
                (queue_outcome, topic_outcome)
            }),
            (queue, topic) => (
                queue.map_or(SinkOutcome::Skipped, |sink| guarded_publish(sink, event)),
                topic.map_or(SinkOutcome::Skipped, |sink| guarded_publish(sink, event)),
            ),
        }
    }
}

/// Publishes once; a panicking sink becomes a `Failed` outcome.
fn guarded_publish(sink: &dyn EventSink, event: &RecordEvent) -> SinkOutcome {
    panic::catch_unwind(AssertUnwindSafe(|| publish_one(sink, event)))
        .unwrap_or_else(|_| panicked_outcome(sink, event))
}

fn publish_one(sink: &dyn EventSink, event: &RecordEvent) -> SinkOutcome {
    let started_at = Instant::now();
    match sink.publish(event) {
        Ok(receipt) => {
            info!(
                "event=sink_publish module=service status=ok sink={} record_id={} message_id={} duration_ms={}",
                sink.kind(),
                event.record.id,
                receipt.message_id,
                started_at.elapsed().as_millis()
            );
            SinkOutcome::Published(receipt)
        }
        Err(error) => {
            let failure = SinkFailure {
                sink: sink.kind(),
                record_id: event.record.id,
                error,
            };
            warn!(
                "event=sink_publish module=service status=error sink={} record_id={} duration_ms={} error_code={} error={}",
                failure.sink,
                failure.record_id,
                started_at.elapsed().as_millis(),
                failure.kind(),
                failure.error
            );
            SinkOutcome::Failed(failure)
        }
    }
}

fn panicked_outcome(sink: &dyn EventSink, event: &RecordEvent) -> SinkOutcome {
    let failure = SinkFailure {
        sink: sink.kind(),
        record_id: event.record.id,
        error: SinkError::Unavailable("publish panicked".to_string()),
    };
    warn!(
        "event=sink_publish module=service status=error sink={} record_id={} error_code={} error={}",
        failure.sink,
        failure.record_id,
        failure.kind(),
        failure.error
    );
    SinkOutcome::Failed(failure)
}
