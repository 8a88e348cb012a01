//! Project record mirrored from the business store.
//!
//! Reminder logic reads `status` and `end_date` only.

use super::OwnerId;
use serde::{Deserialize, Serialize};

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Planning,
    /// Active work. The only status eligible for deadline reminders.
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "in-progress",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "planning" => Some(Self::Planning),
            "in-progress" => Some(Self::InProgress),
            "on-hold" => Some(Self::OnHold),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Identifier assigned by the business store.
    pub id: String,
    pub owner_id: OwnerId,
    pub title: String,
    pub status: ProjectStatus,
    /// Deadline in epoch milliseconds. Projects without one never remind.
    pub end_date: Option<i64>,
    pub client_name: Option<String>,
}

impl Project {
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        title: impl Into<String>,
        status: ProjectStatus,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            title: title.into(),
            status,
            end_date: None,
            client_name: None,
        }
    }

    pub fn with_end_date(mut self, end_date: i64) -> Self {
        self.end_date = Some(end_date);
        self
    }
}
