//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Apply the best-effort failure policy for notification writes.

pub mod notification_service;
pub mod reminder_rules;
pub mod reminder_service;
