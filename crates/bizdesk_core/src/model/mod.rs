//! Domain model for notifications and the records they are derived from.
//!
//! # Responsibility
//! - Define the notification record owned by core.
//! - Define read-only project/meeting shapes mirrored from the business store.
//!
//! # Invariants
//! - Notifications are owner-scoped; owner never changes after creation.
//! - Projects and meetings are never mutated by reminder logic.

pub mod meeting;
pub mod notification;
pub mod project;

/// Opaque identifier of the signed-in user owning a record.
pub type OwnerId = String;

/// Epoch milliseconds in one day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
