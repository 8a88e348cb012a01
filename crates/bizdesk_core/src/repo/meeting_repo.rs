//! Local mirror of owner meetings.

use crate::db::migrations::ensure_schema_ready;
use crate::model::meeting::{Meeting, MeetingStatus};
use crate::repo::notification_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const MEETING_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    status,
    scheduled_at,
    location
FROM meetings";

pub trait MeetingRepository {
    /// Inserts or replaces one meeting by `(owner_id, id)`.
    fn upsert_meeting(&self, meeting: &Meeting) -> RepoResult<()>;
    fn get_meeting(&self, owner_id: &str, id: &str) -> RepoResult<Option<Meeting>>;
    /// Lists meetings ordered by start time.
    fn list_meetings(&self, owner_id: &str) -> RepoResult<Vec<Meeting>>;
    fn delete_meeting(&self, owner_id: &str, id: &str) -> RepoResult<()>;
}

#[derive(Clone, Copy)]
pub struct SqliteMeetingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMeetingRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MeetingRepository for SqliteMeetingRepository<'_> {
    fn upsert_meeting(&self, meeting: &Meeting) -> RepoResult<()> {
        if meeting.id.trim().is_empty() || meeting.owner_id.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "meeting id and owner must not be blank".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO meetings (id, owner_id, title, status, scheduled_at, location)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (owner_id, id) DO UPDATE SET
                title = excluded.title,
                status = excluded.status,
                scheduled_at = excluded.scheduled_at,
                location = excluded.location,
                updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000);",
            params![
                meeting.id.as_str(),
                meeting.owner_id.as_str(),
                meeting.title.as_str(),
                meeting.status.as_str(),
                meeting.scheduled_at,
                meeting.location.as_deref(),
            ],
        )?;
        Ok(())
    }

    fn get_meeting(&self, owner_id: &str, id: &str) -> RepoResult<Option<Meeting>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEETING_SELECT_SQL} WHERE owner_id = ?1 AND id = ?2;"
        ))?;
        let mut rows = stmt.query(params![owner_id, id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_meeting_row(row)?));
        }
        Ok(None)
    }

    fn list_meetings(&self, owner_id: &str) -> RepoResult<Vec<Meeting>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEETING_SELECT_SQL} WHERE owner_id = ?1 ORDER BY scheduled_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([owner_id])?;
        let mut meetings = Vec::new();
        while let Some(row) = rows.next()? {
            meetings.push(parse_meeting_row(row)?);
        }
        Ok(meetings)
    }

    fn delete_meeting(&self, owner_id: &str, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM meetings WHERE owner_id = ?1 AND id = ?2;",
            params![owner_id, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn parse_meeting_row(row: &Row<'_>) -> RepoResult<Meeting> {
    let status_text: String = row.get("status")?;
    let status = MeetingStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in meetings.status"))
    })?;

    Ok(Meeting {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        status,
        scheduled_at: row.get("scheduled_at")?,
        location: row.get("location")?,
    })
}
