//! Notification domain model.
//!
//! # Responsibility
//! - Define the persisted notification record and its creation command.
//! - Provide validation and display ordering helpers.
//!
//! # Invariants
//! - `read` is the only field mutated after creation.
//! - At most one `Auto` notification exists per `(owner_id, kind, related_id)`.
//! - Display order is `created_at DESC`.

use super::OwnerId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Storage-assigned notification identifier.
pub type NotificationId = Uuid;

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Project end date is approaching.
    Deadline,
    /// Meeting is scheduled for tomorrow.
    Meeting,
    /// Payment related reminder.
    Payment,
    /// Free-form informational message.
    Info,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deadline => "deadline",
            Self::Meeting => "meeting",
            Self::Payment => "payment",
            Self::Info => "info",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "deadline" => Some(Self::Deadline),
            "meeting" => Some(Self::Meeting),
            "payment" => Some(Self::Payment),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

/// Display urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Who produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationOrigin {
    /// Synthesized by the reminder sweep. Subject to the uniqueness rule.
    Auto,
    /// Created explicitly by a caller.
    Manual,
}

impl NotificationOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(Self::Auto),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// Persisted notification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Creation time in epoch milliseconds, assigned by storage.
    pub created_at: i64,
    pub read: bool,
    pub priority: Priority,
    /// Originating project or meeting id. May dangle after source deletion.
    pub related_id: Option<String>,
    pub owner_id: OwnerId,
    pub origin: NotificationOrigin,
}

/// Creation command for a notification. Storage fills `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub related_id: Option<String>,
    pub owner_id: OwnerId,
    pub origin: NotificationOrigin,
}

impl NewNotification {
    /// Validates fields before persistence.
    pub fn validate(&self) -> Result<(), NotificationValidationError> {
        if self.title.trim().is_empty() {
            return Err(NotificationValidationError::EmptyTitle);
        }
        if self.owner_id.trim().is_empty() {
            return Err(NotificationValidationError::EmptyOwner);
        }
        if self.origin == NotificationOrigin::Auto && self.related_id.is_none() {
            return Err(NotificationValidationError::AutoWithoutRelatedId);
        }
        Ok(())
    }
}

/// Validation failures for notification writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationValidationError {
    EmptyTitle,
    EmptyOwner,
    /// Automatic notifications must reference their source record.
    AutoWithoutRelatedId,
}

impl Display for NotificationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "notification title must not be blank"),
            Self::EmptyOwner => write!(f, "notification owner must not be blank"),
            Self::AutoWithoutRelatedId => {
                write!(f, "automatic notification requires a related id")
            }
        }
    }
}

impl Error for NotificationValidationError {}

/// Sorts notifications newest first.
///
/// Equal timestamps keep their incoming relative order.
pub fn sort_newest_first(notifications: &mut [Notification]) {
    notifications.sort_by(|left, right| right.created_at.cmp(&left.created_at));
}
