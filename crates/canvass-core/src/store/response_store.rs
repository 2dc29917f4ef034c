use chrono::Utc;

use crate::db::Database;
use crate::error::ServerError;
use crate::models::response::Response;

#[derive(Clone)]
pub struct ResponseStore {
    db: Database,
}

impl ResponseStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn append(&self, response: &Response) -> Result<(), ServerError> {
        let r = response.clone();
        self.db
            .with_conn_async(move |conn| {
                conn.execute(
                    "INSERT INTO responses (id, form_id, respondent, answers, submitted_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        r.id,
                        r.form_id,
                        r.respondent,
                        serde_json::to_string(&r.answers).unwrap_or_default(),
                        r.submitted_at.timestamp_millis(),
                    ],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn list_by_form(&self, form_id: &str) -> Result<Vec<Response>, ServerError> {
        let form_id = form_id.to_string();
        self.db
            .with_conn_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, form_id, respondent, answers, submitted_at
                     FROM responses WHERE form_id = ?1 ORDER BY submitted_at DESC",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![form_id], |row| Ok(row_to_response(row)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }

}

fn row_to_response(row: &rusqlite::Row<'_>) -> Response {
    let answers_str: String = row.get(3).unwrap_or_default();
    let submitted_ms: i64 = row.get(4).unwrap_or(0);

    Response {
        id: row.get(0).unwrap_or_default(),
        form_id: row.get(1).unwrap_or_default(),
        respondent: row.get(2).unwrap_or(None),
        answers: serde_json::from_str(&answers_str).unwrap_or_default(),
        submitted_at: chrono::DateTime::from_timestamp_millis(submitted_ms)
            .unwrap_or_else(Utc::now),
    }
}
