//! Inbound invocation surface.
//!
//! # Responsibility
//! - Map operation names and JSON arguments onto service calls.
//! - Reject unknown operations and malformed arguments before any I/O.

pub mod router;
