//! Explicit per-owner session over one SQLite connection.
//!
//! # Responsibility
//! - Own the database handle and the signed-in owner for one session.
//! - Hand out owner-scoped repositories, services and the reconciler.
//!
//! # Invariants
//! - A session is bound to exactly one non-blank owner for its lifetime.
//! - Every repository handed out borrows the session connection.

use crate::clock::Clock;
use crate::config::{ConfigError, ReminderConfig};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::OwnerId;
use crate::reconcile::feed::{FeedSnapshot, SourceEvent};
use crate::reconcile::reconciler::Reconciler;
use crate::repo::meeting_repo::{MeetingRepository, SqliteMeetingRepository};
use crate::repo::notification_repo::{
    NotificationRepository, RepoResult, SqliteNotificationRepository,
};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::service::notification_service::NotificationService;
use crate::service::reminder_rules::ReminderContext;
use crate::service::reminder_service::{ReminderService, SweepReport};
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

#[derive(Debug)]
pub enum SessionError {
    InvalidOwner,
    Config(ConfigError),
    Db(DbError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOwner => write!(f, "session owner must not be blank"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidOwner => None,
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for SessionError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

pub struct Session {
    conn: Connection,
    owner_id: OwnerId,
    config: ReminderConfig,
}

impl Session {
    /// Opens (and migrates) the database file for `owner_id`.
    pub fn open(
        path: impl AsRef<Path>,
        owner_id: impl Into<OwnerId>,
        config: ReminderConfig,
    ) -> Result<Self, SessionError> {
        let (owner_id, config) = check_inputs(owner_id.into(), config)?;
        let conn = open_db(path)?;
        Ok(Self::with_connection(conn, owner_id, config))
    }

    /// Opens a throwaway in-memory session.
    pub fn open_in_memory(
        owner_id: impl Into<OwnerId>,
        config: ReminderConfig,
    ) -> Result<Self, SessionError> {
        let (owner_id, config) = check_inputs(owner_id.into(), config)?;
        let conn = open_db_in_memory()?;
        Ok(Self::with_connection(conn, owner_id, config))
    }

    fn with_connection(conn: Connection, owner_id: OwnerId, config: ReminderConfig) -> Self {
        info!("event=session_open module=session status=ok owner={owner_id}");
        Self {
            conn,
            owner_id,
            config,
        }
    }

    /// Closes the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<(), SessionError> {
        let owner_id = self.owner_id;
        match self.conn.close() {
            Ok(()) => {
                info!("event=session_close module=session status=ok owner={owner_id}");
                Ok(())
            }
            Err((_conn, err)) => {
                warn!(
                    "event=session_close module=session status=error owner={owner_id} error={err}"
                );
                Err(SessionError::Db(DbError::Sqlite(err)))
            }
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn notification_repo(&self) -> RepoResult<SqliteNotificationRepository<'_>> {
        SqliteNotificationRepository::try_new(&self.conn)
    }

    pub fn project_repo(&self) -> RepoResult<SqliteProjectRepository<'_>> {
        SqliteProjectRepository::try_new(&self.conn)
    }

    pub fn meeting_repo(&self) -> RepoResult<SqliteMeetingRepository<'_>> {
        SqliteMeetingRepository::try_new(&self.conn)
    }

    /// Notification facade scoped to the session owner.
    pub fn notifications(
        &self,
    ) -> RepoResult<NotificationService<SqliteNotificationRepository<'_>>> {
        Ok(NotificationService::new(
            self.notification_repo()?,
            self.owner_id.clone(),
        ))
    }

    /// Reconciler writing into this session's notification store.
    pub fn reconciler<C: Clock>(
        &self,
        clock: C,
    ) -> RepoResult<Reconciler<SqliteNotificationRepository<'_>, C>> {
        Ok(Reconciler::new(
            self.notification_repo()?,
            clock,
            self.config.clone(),
        ))
    }

    /// Current local state as an ordered snapshot feed for the owner.
    pub fn snapshot_events(&self) -> RepoResult<Vec<SourceEvent>> {
        Ok(vec![
            SourceEvent::OwnerChanged(Some(self.owner_id.clone())),
            SourceEvent::Projects(FeedSnapshot::Ready(
                self.project_repo()?.list_projects(&self.owner_id)?,
            )),
            SourceEvent::Meetings(FeedSnapshot::Ready(
                self.meeting_repo()?.list_meetings(&self.owner_id)?,
            )),
            SourceEvent::Notifications(FeedSnapshot::Ready(
                self.notification_repo()?.list_notifications(&self.owner_id)?,
            )),
        ])
    }

    /// Runs one reminder sweep over the locally mirrored projects and meetings.
    pub fn refresh_reminders(&self, now_ms: i64) -> RepoResult<SweepReport> {
        let repo = self.notification_repo()?;
        let projects = self.project_repo()?.list_projects(&self.owner_id)?;
        let meetings = self.meeting_repo()?.list_meetings(&self.owner_id)?;
        let existing = repo.list_notifications(&self.owner_id)?;

        let context = ReminderContext {
            owner_id: &self.owner_id,
            now_ms,
            config: &self.config,
        };
        Ok(ReminderService::new(repo).sweep(&context, &projects, &meetings, &existing))
    }
}

fn check_inputs(
    owner_id: OwnerId,
    config: ReminderConfig,
) -> Result<(OwnerId, ReminderConfig), SessionError> {
    let owner_id = owner_id.trim().to_string();
    if owner_id.is_empty() {
        return Err(SessionError::InvalidOwner);
    }
    config.validate()?;
    Ok((owner_id, config))
}
