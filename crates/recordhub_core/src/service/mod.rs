//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and sink calls into use-case level APIs.
//! - Keep transport/CLI layers decoupled from storage and delivery details.

pub mod record_service;
