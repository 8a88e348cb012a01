//! Single-writer reminder reconciler.
//!
//! # Responsibility
//! - Keep the latest project/meeting/notification snapshots for one owner.
//! - Re-run the reminder sweep after every relevant change.
//!
//! # Invariants
//! - Only this type creates automatic notifications for a session.
//! - Notifications created by a sweep are folded into the local view before
//!   the next event is handled.

use crate::clock::Clock;
use crate::config::ReminderConfig;
use crate::model::meeting::Meeting;
use crate::model::notification::{sort_newest_first, Notification};
use crate::model::project::Project;
use crate::model::OwnerId;
use crate::reconcile::feed::{FeedSnapshot, SourceEvent};
use crate::repo::notification_repo::NotificationRepository;
use crate::service::reminder_rules::ReminderContext;
use crate::service::reminder_service::{ReminderService, SweepReport};
use log::{debug, info, warn};

/// Totals for a drained feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub events: usize,
    pub sweeps: usize,
    pub created: usize,
    pub failed: usize,
}

pub struct Reconciler<R: NotificationRepository, C: Clock> {
    service: ReminderService<R>,
    clock: C,
    config: ReminderConfig,
    owner_id: Option<OwnerId>,
    projects: Vec<Project>,
    meetings: Vec<Meeting>,
    /// `None` while the notification snapshot is loading.
    notifications: Option<Vec<Notification>>,
}

impl<R: NotificationRepository, C: Clock> Reconciler<R, C> {
    pub fn new(repo: R, clock: C, config: ReminderConfig) -> Self {
        Self {
            service: ReminderService::new(repo),
            clock,
            config,
            owner_id: None,
            projects: Vec::new(),
            meetings: Vec::new(),
            notifications: None,
        }
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    /// Current notification view, newest first. `None` while loading.
    pub fn notifications(&self) -> Option<&[Notification]> {
        self.notifications.as_deref()
    }

    /// Applies one event and re-evaluates when possible.
    ///
    /// Returns the sweep report when a sweep ran.
    pub fn handle(&mut self, event: SourceEvent) -> Option<SweepReport> {
        match event {
            SourceEvent::OwnerChanged(owner_id) => {
                info!(
                    "event=reconcile_owner module=reconcile status=ok owner={}",
                    owner_id.as_deref().unwrap_or("-")
                );
                self.owner_id = owner_id;
                self.projects.clear();
                self.meetings.clear();
                self.notifications = None;
            }
            SourceEvent::Projects(snapshot) => {
                self.projects = snapshot_items("projects", snapshot);
            }
            SourceEvent::Meetings(snapshot) => {
                self.meetings = snapshot_items("meetings", snapshot);
            }
            SourceEvent::Notifications(FeedSnapshot::Loading) => {
                self.notifications = None;
            }
            SourceEvent::Notifications(snapshot) => {
                self.notifications = Some(snapshot_items("notifications", snapshot));
            }
        }
        self.evaluate()
    }

    /// Drains a feed until it ends.
    pub fn run(&mut self, events: impl IntoIterator<Item = SourceEvent>) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        for event in events {
            summary.events += 1;
            if let Some(report) = self.handle(event) {
                summary.sweeps += 1;
                summary.created += report.created.len();
                summary.failed += report.failed;
            }
        }
        info!(
            "event=reconcile_run module=reconcile status=ok events={} sweeps={} created={} failed={}",
            summary.events, summary.sweeps, summary.created, summary.failed
        );
        summary
    }

    fn evaluate(&mut self) -> Option<SweepReport> {
        let owner_id = self.owner_id.as_deref()?;
        let Some(notifications) = self.notifications.as_mut() else {
            debug!("event=reconcile_sweep module=reconcile status=skipped reason=notifications_loading");
            return None;
        };

        let context = ReminderContext {
            owner_id,
            now_ms: self.clock.now_ms(),
            config: &self.config,
        };
        let report = self
            .service
            .sweep(&context, &self.projects, &self.meetings, notifications);

        if !report.created.is_empty() {
            notifications.extend(report.created.iter().cloned());
            sort_newest_first(notifications);
        }
        Some(report)
    }
}

fn snapshot_items<T>(collection: &str, snapshot: FeedSnapshot<T>) -> Vec<T> {
    match snapshot {
        FeedSnapshot::Ready(items) => items,
        FeedSnapshot::Loading => Vec::new(),
        FeedSnapshot::Failed(message) => {
            warn!(
                "event=reconcile_snapshot module=reconcile status=error collection={collection} error={message}"
            );
            Vec::new()
        }
    }
}
