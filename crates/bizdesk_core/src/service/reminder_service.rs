//! Reminder sweep: plan missing reminders and write them back.
//!
//! # Responsibility
//! - Turn planned creation commands into stored notifications.
//! - Report what happened without ever failing the caller.
//!
//! # Invariants
//! - Write failures are logged and counted, never propagated.
//! - A storage-level duplicate is counted as skipped, not as a failure.

use crate::model::meeting::Meeting;
use crate::model::notification::Notification;
use crate::model::project::Project;
use crate::repo::notification_repo::NotificationRepository;
use crate::service::reminder_rules::{plan_reminders, ReminderContext};
use log::{debug, error, info};
use std::time::Instant;

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Commands produced by the planner.
    pub planned: usize,
    /// Notifications actually stored by this sweep.
    pub created: Vec<Notification>,
    /// Commands rejected by the storage uniqueness rule.
    pub skipped_duplicates: usize,
    /// Commands whose write failed.
    pub failed: usize,
}

impl SweepReport {
    pub fn is_noop(&self) -> bool {
        self.planned == 0
    }
}

pub struct ReminderService<R: NotificationRepository> {
    repo: R,
}

impl<R: NotificationRepository> ReminderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Plans against the given snapshots and stores every missing reminder.
    pub fn sweep(
        &self,
        context: &ReminderContext<'_>,
        projects: &[Project],
        meetings: &[Meeting],
        existing: &[Notification],
    ) -> SweepReport {
        let started_at = Instant::now();
        let commands = plan_reminders(context, projects, meetings, existing);
        let mut report = SweepReport {
            planned: commands.len(),
            ..SweepReport::default()
        };

        for command in &commands {
            let related_id = command.related_id.as_deref().unwrap_or("-");
            match self.repo.create_notification(command) {
                Ok(Some(notification)) => {
                    debug!(
                        "event=reminder_create module=service status=ok kind={} related_id={related_id} priority={}",
                        command.kind.as_str(),
                        command.priority.as_str()
                    );
                    report.created.push(notification);
                }
                Ok(None) => {
                    debug!(
                        "event=reminder_create module=service status=duplicate kind={} related_id={related_id}",
                        command.kind.as_str()
                    );
                    report.skipped_duplicates += 1;
                }
                Err(err) => {
                    error!(
                        "event=reminder_create module=service status=error kind={} related_id={related_id} error={err}",
                        command.kind.as_str()
                    );
                    report.failed += 1;
                }
            }
        }

        if !report.is_noop() {
            info!(
                "event=reminder_sweep module=service status=ok owner={} planned={} created={} duplicates={} failed={} duration_ms={}",
                context.owner_id,
                report.planned,
                report.created.len(),
                report.skipped_duplicates,
                report.failed,
                started_at.elapsed().as_millis()
            );
        }

        report
    }
}
