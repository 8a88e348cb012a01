//! Snapshot-driven reminder reconciliation.
//!
//! # Responsibility
//! - Model upstream subscriptions as an ordered stream of immutable snapshots.
//! - Own every automatic notification write in one reconciler.
//!
//! # Invariants
//! - Evaluation never runs while the notification snapshot is loading.
//! - Failed snapshots degrade to empty lists.

pub mod feed;
pub mod reconciler;
