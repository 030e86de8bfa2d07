//! Record store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value contract the orchestrator writes through.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Writes are upserts keyed by record id, atomic per key.
//! - Read paths reject undecodable persisted rows instead of masking them.

pub mod record_repo;
