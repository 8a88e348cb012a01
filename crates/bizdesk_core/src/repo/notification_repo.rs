//! Notification repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped create/read/mark/delete APIs over `notifications`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `NewNotification::validate()` before SQL mutations.
//! - Automatic notifications are unique per `(owner_id, kind, related_id)`;
//!   a colliding insert is reported as `Ok(None)`, not as an error.
//! - Lists are ordered `created_at DESC, rowid DESC`.

use crate::db::migrations::ensure_schema_ready;
use crate::db::DbError;
use crate::model::notification::{
    NewNotification, Notification, NotificationId, NotificationKind, NotificationOrigin,
    NotificationValidationError, Priority,
};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTIFICATION_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    kind,
    title,
    message,
    priority,
    related_id,
    origin,
    is_read,
    created_at
FROM notifications";

/// Storage clock in epoch milliseconds.
const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000.0 AS INTEGER)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every persistence contract in core.
#[derive(Debug)]
pub enum RepoError {
    Validation(NotificationValidationError),
    Db(DbError),
    /// Target record id does not exist for the owner.
    NotFound(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<NotificationValidationError> for RepoError {
    fn from(value: NotificationValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for owner-scoped notification storage.
pub trait NotificationRepository {
    /// Inserts one notification.
    ///
    /// Returns `Ok(None)` when an automatic notification for the same source
    /// already exists.
    fn create_notification(&self, command: &NewNotification) -> RepoResult<Option<Notification>>;
    fn get_notification(
        &self,
        owner_id: &str,
        id: NotificationId,
    ) -> RepoResult<Option<Notification>>;
    /// Lists all notifications of one owner, newest first.
    fn list_notifications(&self, owner_id: &str) -> RepoResult<Vec<Notification>>;
    fn count_unread(&self, owner_id: &str) -> RepoResult<u32>;
    /// Sets `read = true`. Marking an already-read notification succeeds.
    fn mark_read(&self, owner_id: &str, id: NotificationId) -> RepoResult<()>;
    /// Marks every unread notification read in one statement.
    ///
    /// Returns the number of rows written; issues no write when none are unread.
    fn mark_all_read(&self, owner_id: &str) -> RepoResult<usize>;
    fn delete_notification(&self, owner_id: &str, id: NotificationId) -> RepoResult<()>;
}

/// SQLite-backed notification repository.
#[derive(Clone, Copy)]
pub struct SqliteNotificationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NotificationRepository for SqliteNotificationRepository<'_> {
    fn create_notification(&self, command: &NewNotification) -> RepoResult<Option<Notification>> {
        command.validate()?;

        let id = Uuid::new_v4();
        let inserted = self.conn.execute(
            &format!(
                "INSERT INTO notifications (
                    id,
                    owner_id,
                    kind,
                    title,
                    message,
                    priority,
                    related_id,
                    origin,
                    is_read,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, {NOW_MS_SQL})
                ON CONFLICT DO NOTHING;"
            ),
            params![
                id.to_string(),
                command.owner_id.as_str(),
                command.kind.as_str(),
                command.title.as_str(),
                command.message.as_str(),
                command.priority.as_str(),
                command.related_id.as_deref(),
                command.origin.as_str(),
            ],
        )?;

        if inserted == 0 {
            return Ok(None);
        }

        let created = self.get_notification(&command.owner_id, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("notification {id} missing after insert"))
        })?;
        Ok(Some(created))
    }

    fn get_notification(
        &self,
        owner_id: &str,
        id: NotificationId,
    ) -> RepoResult<Option<Notification>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTIFICATION_SELECT_SQL}
             WHERE id = ?1
               AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), owner_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_notification_row(row)?));
        }

        Ok(None)
    }

    fn list_notifications(&self, owner_id: &str) -> RepoResult<Vec<Notification>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTIFICATION_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY created_at DESC, rowid DESC;"
        ))?;

        let mut rows = stmt.query([owner_id])?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(parse_notification_row(row)?);
        }

        Ok(notifications)
    }

    fn count_unread(&self, owner_id: &str) -> RepoResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE owner_id = ?1 AND is_read = 0;",
            [owner_id],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }

    fn mark_read(&self, owner_id: &str, id: NotificationId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notifications
             SET is_read = 1
             WHERE id = ?1
               AND owner_id = ?2;",
            params![id.to_string(), owner_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        Ok(())
    }

    fn mark_all_read(&self, owner_id: &str) -> RepoResult<usize> {
        if self.count_unread(owner_id)? == 0 {
            return Ok(0);
        }

        let changed = self.conn.execute(
            "UPDATE notifications
             SET is_read = 1
             WHERE owner_id = ?1
               AND is_read = 0;",
            [owner_id],
        )?;

        Ok(changed)
    }

    fn delete_notification(&self, owner_id: &str, id: NotificationId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM notifications WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

fn parse_notification_row(row: &Row<'_>) -> RepoResult<Notification> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in notifications.id"))
    })?;

    let kind_text: String = row.get("kind")?;
    let kind = NotificationKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid kind `{kind_text}` in notifications.kind"
        ))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in notifications.priority"
        ))
    })?;

    let origin_text: String = row.get("origin")?;
    let origin = NotificationOrigin::parse(&origin_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid origin `{origin_text}` in notifications.origin"
        ))
    })?;

    let read = match row.get::<_, i64>("is_read")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_read value `{other}` in notifications.is_read"
            )));
        }
    };

    Ok(Notification {
        id,
        kind,
        title: row.get("title")?,
        message: row.get("message")?,
        created_at: row.get("created_at")?,
        read,
        priority,
        related_id: row.get("related_id")?,
        owner_id: row.get("owner_id")?,
        origin,
    })
}
