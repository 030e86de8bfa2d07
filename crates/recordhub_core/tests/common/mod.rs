#![allow(dead_code)]

use recordhub_core::{
    EventSink, PublishReceipt, Record, RecordEvent, RecordId, RecordStore, SinkError, SinkKind,
    StoreError, StoreResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Store whose every call fails, counting attempts.
#[derive(Default)]
pub struct FailingStore {
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> StoreResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::InvalidData("simulated store outage".to_string()))
    }
}

impl RecordStore for FailingStore {
    fn put_record(&self, _record: &Record) -> StoreResult<()> {
        self.fail()
    }

    fn get_record(&self, _id: RecordId) -> StoreResult<Option<Record>> {
        self.fail()
    }

    fn list_records(&self) -> StoreResult<Vec<Record>> {
        self.fail()
    }
}

/// Sink that records every publish and optionally fails it.
pub struct RecordingSink {
    kind: SinkKind,
    fail: bool,
    calls: AtomicUsize,
    events: Mutex<Vec<RecordEvent>>,
}

impl RecordingSink {
    pub fn ok(kind: SinkKind) -> Arc<Self> {
        Arc::new(Self::build(kind, false))
    }

    pub fn failing(kind: SinkKind) -> Arc<Self> {
        Arc::new(Self::build(kind, true))
    }

    fn build(kind: SinkKind, fail: bool) -> Self {
        Self {
            kind,
            fail,
            calls: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<RecordEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn kind(&self) -> SinkKind {
        self.kind
    }

    fn publish(&self, event: &RecordEvent) -> Result<PublishReceipt, SinkError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(SinkError::Unavailable(format!("simulated {} outage", self.kind)));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(PublishReceipt {
            sink: self.kind,
            message_id: format!("{}-{call}", self.kind),
        })
    }
}

/// Sink whose publish panics after counting the call.
pub struct PanickingSink {
    kind: SinkKind,
    calls: AtomicUsize,
}

impl PanickingSink {
    pub fn new(kind: SinkKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EventSink for PanickingSink {
    fn kind(&self) -> SinkKind {
        self.kind
    }

    fn publish(&self, _event: &RecordEvent) -> Result<PublishReceipt, SinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("simulated {} crash", self.kind);
    }
}
