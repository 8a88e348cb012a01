//! Core domain logic for bizdesk notifications.
//!
//! Derives deadline and meeting reminders from project/meeting snapshots,
//! stores them per owner, and exposes read/mark/dismiss operations.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;
pub mod session;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, ReminderConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::meeting::{Meeting, MeetingStatus};
pub use model::notification::{
    sort_newest_first, NewNotification, Notification, NotificationId, NotificationKind,
    NotificationOrigin, NotificationValidationError, Priority,
};
pub use model::project::{Project, ProjectStatus};
pub use model::{OwnerId, DAY_MS};
pub use reconcile::feed::{snapshot_feed, FeedPublisher, FeedSnapshot, SourceEvent};
pub use reconcile::reconciler::{ReconcileSummary, Reconciler};
pub use repo::meeting_repo::{MeetingRepository, SqliteMeetingRepository};
pub use repo::notification_repo::{
    NotificationRepository, RepoError, RepoResult, SqliteNotificationRepository,
};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use service::notification_service::{NotificationService, NotifyRequest};
pub use service::reminder_rules::{plan_reminders, ReminderContext};
pub use service::reminder_service::{ReminderService, SweepReport};
pub use session::{Session, SessionError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
