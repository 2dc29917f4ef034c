use chrono::Utc;
use rusqlite::OptionalExtension;

use crate::db::Database;
use crate::error::ServerError;
use crate::models::project::Project;

#[derive(Clone)]
pub struct ProjectStore {
    db: Database,
}

impl ProjectStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, project: &Project) -> Result<(), ServerError> {
        let p = project.clone();
        self.db
            .with_conn_async(move |conn| {
                conn.execute(
                    "INSERT INTO projects (id, name, description, user_id, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![
                        p.id,
                        p.name,
                        p.description,
                        p.user_id,
                        p.created_at.timestamp_millis(),
                        p.updated_at.timestamp_millis(),
                    ],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Project>, ServerError> {
        let id = id.to_string();
        self.db
            .with_conn_async(move |conn| {
                conn.query_row(
                    "SELECT id, name, description, user_id, created_at, updated_at
                     FROM projects WHERE id = ?1",
                    rusqlite::params![id],
                    |row| Ok(row_to_project(row)),
                )
                .optional()
            })
            .await
    }

    /// Fetch a project only when it belongs to the given user. The caller
    /// cannot distinguish "missing" from "not owned".
    pub async fn get_owned(&self, id: &str, user_id: &str) -> Result<Option<Project>, ServerError> {
        let id = id.to_string();
        let user_id = user_id.to_string();
        self.db
            .with_conn_async(move |conn| {
                conn.query_row(
                    "SELECT id, name, description, user_id, created_at, updated_at
                     FROM projects WHERE id = ?1 AND user_id = ?2",
                    rusqlite::params![id, user_id],
                    |row| Ok(row_to_project(row)),
                )
                .optional()
            })
            .await
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Project>, ServerError> {
        let user_id = user_id.to_string();
        self.db
            .with_conn_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, description, user_id, created_at, updated_at
                     FROM projects WHERE user_id = ?1 ORDER BY created_at DESC",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![user_id], |row| Ok(row_to_project(row)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }

    pub async fn rename(&self, id: &str, name: &str) -> Result<(), ServerError> {
        let id = id.to_string();
        let name = name.to_string();
        let now = Utc::now().timestamp_millis();
        self.db
            .with_conn_async(move |conn| {
                conn.execute(
                    "UPDATE projects SET name = ?1, updated_at = ?2 WHERE id = ?3",
                    rusqlite::params![name, now, id],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, ServerError> {
        let id = id.to_string();
        self.db
            .with_conn_async(move |conn| {
                let n = conn.execute("DELETE FROM projects WHERE id = ?1", rusqlite::params![id])?;
                Ok(n > 0)
            })
            .await
    }
}

fn row_to_project(row: &rusqlite::Row<'_>) -> Project {
    let created_ms: i64 = row.get(4).unwrap_or(0);
    let updated_ms: i64 = row.get(5).unwrap_or(0);

    Project {
        id: row.get(0).unwrap_or_default(),
        name: row.get(1).unwrap_or_default(),
        description: row.get(2).unwrap_or(None),
        user_id: row.get(3).unwrap_or_default(),
        created_at: chrono::DateTime::from_timestamp_millis(created_ms).unwrap_or_else(Utc::now),
        updated_at: chrono::DateTime::from_timestamp_millis(updated_ms).unwrap_or_else(Utc::now),
    }
}
