//! Domain model for records and the events derived from them.
//!
//! # Responsibility
//! - Define the canonical record shape persisted by the store.
//! - Define the envelope mirrored to event sinks.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId` assigned at creation.
//! - Event envelopes are derived copies; the store stays authoritative.

pub mod event;
pub mod record;
