//! Notification read/mutation use-cases for UI callers.
//!
//! # Responsibility
//! - Expose the owner's notification list newest first.
//! - Provide mark-read, mark-all-read and dismiss operations.
//!
//! # Invariants
//! - Mutations are best-effort: storage failures are logged and swallowed.
//! - Every operation is scoped to the service owner.

use crate::model::notification::{
    sort_newest_first, NewNotification, Notification, NotificationId, NotificationKind,
    NotificationOrigin, Priority,
};
use crate::model::OwnerId;
use crate::repo::notification_repo::{NotificationRepository, RepoError, RepoResult};
use log::{debug, error, info, warn};

/// Request model for a caller-authored notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRequest {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub related_id: Option<String>,
}

/// Owner-scoped notification facade.
pub struct NotificationService<R: NotificationRepository> {
    repo: R,
    owner_id: OwnerId,
}

impl<R: NotificationRepository> NotificationService<R> {
    pub fn new(repo: R, owner_id: impl Into<OwnerId>) -> Self {
        Self {
            repo,
            owner_id: owner_id.into(),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Lists notifications newest first, propagating storage errors.
    pub fn try_list(&self) -> RepoResult<Vec<Notification>> {
        let mut notifications = self.repo.list_notifications(&self.owner_id)?;
        sort_newest_first(&mut notifications);
        Ok(notifications)
    }

    /// Lists notifications newest first.
    ///
    /// A read failure is logged and yields an empty list.
    pub fn list(&self) -> Vec<Notification> {
        self.try_list().unwrap_or_else(|err| {
            error!(
                "event=notification_list module=service status=error owner={} error={err}",
                self.owner_id
            );
            Vec::new()
        })
    }

    /// Returns the unread count, or zero when storage cannot be read.
    pub fn unread_count(&self) -> u32 {
        self.repo.count_unread(&self.owner_id).unwrap_or_else(|err| {
            error!(
                "event=notification_unread_count module=service status=error owner={} error={err}",
                self.owner_id
            );
            0
        })
    }

    /// Stores a manual notification for the owner.
    pub fn notify(&self, request: NotifyRequest) -> RepoResult<Notification> {
        let command = NewNotification {
            kind: request.kind,
            title: request.title.trim().to_string(),
            message: request.message,
            priority: request.priority,
            related_id: request.related_id,
            owner_id: self.owner_id.clone(),
            origin: NotificationOrigin::Manual,
        };
        self.repo
            .create_notification(&command)?
            .ok_or_else(|| RepoError::InvalidData("manual notification was not stored".to_string()))
    }

    /// Marks one notification read. Idempotent.
    pub fn mark_as_read(&self, id: NotificationId) {
        match self.repo.mark_read(&self.owner_id, id) {
            Ok(()) => debug!("event=notification_mark_read module=service status=ok id={id}"),
            Err(err) => warn!(
                "event=notification_mark_read module=service status=error id={id} error={err}"
            ),
        }
    }

    /// Marks every unread notification read in one write.
    ///
    /// Returns the number of notifications changed; zero on failure.
    pub fn mark_all_as_read(&self) -> usize {
        match self.repo.mark_all_read(&self.owner_id) {
            Ok(changed) => {
                info!(
                    "event=notification_mark_all_read module=service status=ok owner={} changed={changed}",
                    self.owner_id
                );
                changed
            }
            Err(err) => {
                warn!(
                    "event=notification_mark_all_read module=service status=error owner={} error={err}",
                    self.owner_id
                );
                0
            }
        }
    }

    /// Permanently deletes one notification. Dismissing a missing id is benign.
    pub fn dismiss(&self, id: NotificationId) {
        match self.repo.delete_notification(&self.owner_id, id) {
            Ok(()) => info!("event=notification_dismiss module=service status=ok id={id}"),
            Err(RepoError::NotFound(_)) => {
                debug!("event=notification_dismiss module=service status=noop id={id}")
            }
            Err(err) => warn!(
                "event=notification_dismiss module=service status=error id={id} error={err}"
            ),
        }
    }
}
