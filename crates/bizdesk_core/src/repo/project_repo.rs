//! Local mirror of owner projects.
//!
//! # Invariants
//! - `(owner_id, id)` identifies one project row.
//! - Deleting a project does not touch notifications referencing it.

use crate::db::migrations::ensure_schema_ready;
use crate::model::project::{Project, ProjectStatus};
use crate::repo::notification_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    status,
    end_date,
    client_name
FROM projects";

pub trait ProjectRepository {
    /// Inserts or replaces one project by `(owner_id, id)`.
    fn upsert_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, owner_id: &str, id: &str) -> RepoResult<Option<Project>>;
    fn list_projects(&self, owner_id: &str) -> RepoResult<Vec<Project>>;
    fn delete_project(&self, owner_id: &str, id: &str) -> RepoResult<()>;
}

#[derive(Clone, Copy)]
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn upsert_project(&self, project: &Project) -> RepoResult<()> {
        if project.id.trim().is_empty() || project.owner_id.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "project id and owner must not be blank".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO projects (id, owner_id, title, status, end_date, client_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (owner_id, id) DO UPDATE SET
                title = excluded.title,
                status = excluded.status,
                end_date = excluded.end_date,
                client_name = excluded.client_name,
                updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000);",
            params![
                project.id.as_str(),
                project.owner_id.as_str(),
                project.title.as_str(),
                project.status.as_str(),
                project.end_date,
                project.client_name.as_deref(),
            ],
        )?;
        Ok(())
    }

    fn get_project(&self, owner_id: &str, id: &str) -> RepoResult<Option<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} WHERE owner_id = ?1 AND id = ?2;"
        ))?;
        let mut rows = stmt.query(params![owner_id, id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self, owner_id: &str) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} WHERE owner_id = ?1 ORDER BY end_date IS NULL, end_date ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([owner_id])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn delete_project(&self, owner_id: &str, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM projects WHERE owner_id = ?1 AND id = ?2;",
            params![owner_id, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in projects.status"))
    })?;

    Ok(Project {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        status,
        end_date: row.get("end_date")?,
        client_name: row.get("client_name")?,
    })
}
