use chrono::Utc;
use rusqlite::OptionalExtension;

use crate::db::Database;
use crate::error::ServerError;
use crate::models::form::{Form, FormStatus};

#[derive(Clone)]
pub struct FormStore {
    db: Database,
}

impl FormStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, form: &Form) -> Result<(), ServerError> {
        let f = form.clone();
        self.db
            .with_conn_async(move |conn| {
                conn.execute(
                    "INSERT INTO forms (id, project_id, name, interview_topic, system_prompt, \
                     initial_question, form_title, form_description, workflow_id, webhook_url, \
                     sheet_id, sheet_url, status, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                    rusqlite::params![
                        f.id,
                        f.project_id,
                        f.name,
                        f.interview_topic,
                        f.system_prompt,
                        f.initial_question,
                        f.form_title,
                        f.form_description,
                        f.workflow_id,
                        f.webhook_url,
                        f.sheet_id,
                        f.sheet_url,
                        f.status.as_str(),
                        f.created_at.timestamp_millis(),
                        f.updated_at.timestamp_millis(),
                    ],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Form>, ServerError> {
        let id = id.to_string();
        self.db
            .with_conn_async(move |conn| {
                conn.query_row(
                    "SELECT id, project_id, name, interview_topic, system_prompt, \
                     initial_question, form_title, form_description, workflow_id, webhook_url, \
                     sheet_id, sheet_url, status, created_at, updated_at \
                     FROM forms WHERE id = ?1",
                    rusqlite::params![id],
                    |row| Ok(row_to_form(row)),
                )
                .optional()
            })
            .await
    }

    pub async fn list_by_project(&self, project_id: &str) -> Result<Vec<Form>, ServerError> {
        let project_id = project_id.to_string();
        self.db
            .with_conn_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, project_id, name, interview_topic, system_prompt, \
                     initial_question, form_title, form_description, workflow_id, webhook_url, \
                     sheet_id, sheet_url, status, created_at, updated_at \
                     FROM forms WHERE project_id = ?1 ORDER BY created_at DESC",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![project_id], |row| Ok(row_to_form(row)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }

    /// Attach workflow identifiers produced by a successful provisioning
    /// round trip and move the form to the given status in one write.
    pub async fn update_workflow_info(
        &self,
        id: &str,
        workflow_id: &str,
        webhook_url: &str,
        sheet_id: Option<String>,
        sheet_url: Option<String>,
        status: FormStatus,
    ) -> Result<(), ServerError> {
        let id = id.to_string();
        let workflow_id = workflow_id.to_string();
        let webhook_url = webhook_url.to_string();
        let now = Utc::now().timestamp_millis();
        self.db
            .with_conn_async(move |conn| {
                conn.execute(
                    "UPDATE forms SET workflow_id = ?1, webhook_url = ?2, sheet_id = ?3, \
                     sheet_url = ?4, status = ?5, updated_at = ?6 WHERE id = ?7",
                    rusqlite::params![
                        workflow_id,
                        webhook_url,
                        sheet_id,
                        sheet_url,
                        status.as_str(),
                        now,
                        id
                    ],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn update_status(&self, id: &str, status: FormStatus) -> Result<(), ServerError> {
        let id = id.to_string();
        let now = Utc::now().timestamp_millis();
        self.db
            .with_conn_async(move |conn| {
                conn.execute(
                    "UPDATE forms SET status = ?1, updated_at = ?2 WHERE id = ?3",
                    rusqlite::params![status.as_str(), now, id],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, ServerError> {
        let id = id.to_string();
        self.db
            .with_conn_async(move |conn| {
                let n = conn.execute("DELETE FROM forms WHERE id = ?1", rusqlite::params![id])?;
                Ok(n > 0)
            })
            .await
    }

    pub async fn response_count(&self, id: &str) -> Result<i64, ServerError> {
        let id = id.to_string();
        self.db
            .with_conn_async(move |conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM responses WHERE form_id = ?1",
                    rusqlite::params![id],
                    |row| row.get(0),
                )
            })
            .await
    }
}

fn row_to_form(row: &rusqlite::Row<'_>) -> Form {
    let created_ms: i64 = row.get(13).unwrap_or(0);
    let updated_ms: i64 = row.get(14).unwrap_or(0);

    Form {
        id: row.get(0).unwrap_or_default(),
        project_id: row.get(1).unwrap_or_default(),
        name: row.get(2).unwrap_or_default(),
        interview_topic: row.get(3).unwrap_or_default(),
        system_prompt: row.get(4).unwrap_or_default(),
        initial_question: row.get(5).unwrap_or_default(),
        form_title: row.get(6).unwrap_or(None),
        form_description: row.get(7).unwrap_or(None),
        workflow_id: row.get(8).unwrap_or(None),
        webhook_url: row.get(9).unwrap_or(None),
        sheet_id: row.get(10).unwrap_or(None),
        sheet_url: row.get(11).unwrap_or(None),
        status: FormStatus::from_str(&row.get::<_, String>(12).unwrap_or_default()),
        created_at: chrono::DateTime::from_timestamp_millis(created_ms).unwrap_or_else(Utc::now),
        updated_at: chrono::DateTime::from_timestamp_millis(updated_ms).unwrap_or_else(Utc::now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::Project;
    use crate::store::{ProjectStore, ResponseStore};

    async fn stores() -> (ProjectStore, FormStore, ResponseStore) {
        let db = Database::open_in_memory().expect("in-memory db");
        let projects = ProjectStore::new(db.clone());
        projects
            .create(&Project::new("p1".to_string(), "Research".to_string(), None, "alice".to_string()))
            .await
            .unwrap();
        (projects, FormStore::new(db.clone()), ResponseStore::new(db))
    }

    fn test_form(id: &str) -> Form {
        Form::new(
            id.to_string(),
            "p1".to_string(),
            "UX".to_string(),
            "mobile app".to_string(),
            "prompt".to_string(),
            "Your name?".to_string(),
            Some("UX".to_string()),
            None,
        )
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let (_, forms, _) = stores().await;
        forms.create(&test_form("f1")).await.unwrap();

        let found = forms.get("f1").await.unwrap().unwrap();
        assert_eq!(found.name, "UX");
        assert_eq!(found.status, FormStatus::WorkflowPending);
        assert!(found.workflow_id.is_none());
    }

    #[tokio::test]
    async fn test_update_workflow_info_activates() {
        let (_, forms, _) = stores().await;
        forms.create(&test_form("f1")).await.unwrap();

        forms
            .update_workflow_info(
                "f1",
                "wf-9",
                "http://engine/form/interview-f1",
                None,
                None,
                FormStatus::Active,
            )
            .await
            .unwrap();

        let form = forms.get("f1").await.unwrap().unwrap();
        assert_eq!(form.status, FormStatus::Active);
        assert_eq!(form.workflow_id.as_deref(), Some("wf-9"));
        assert_eq!(form.webhook_url.as_deref(), Some("http://engine/form/interview-f1"));
    }

    #[tokio::test]
    async fn test_update_status_keeps_workflow_fields_unset() {
        let (_, forms, _) = stores().await;
        forms.create(&test_form("f1")).await.unwrap();
        forms.update_status("f1", FormStatus::WorkflowFailed).await.unwrap();

        let form = forms.get("f1").await.unwrap().unwrap();
        assert_eq!(form.status, FormStatus::WorkflowFailed);
        assert!(form.workflow_id.is_none());
        assert!(form.webhook_url.is_none());
    }

    #[tokio::test]
    async fn test_response_count() {
        let (_, forms, responses) = stores().await;
        forms.create(&test_form("f1")).await.unwrap();
        assert_eq!(forms.response_count("f1").await.unwrap(), 0);

        for i in 0..3 {
            responses
                .append(&crate::models::response::Response::new(
                    format!("r{}", i),
                    "f1".to_string(),
                    None,
                    serde_json::json!({ "q1": "a1" }),
                ))
                .await
                .unwrap();
        }
        assert_eq!(forms.response_count("f1").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_project_delete_cascades_to_forms() {
        let (projects, forms, _) = stores().await;
        forms.create(&test_form("f1")).await.unwrap();

        projects.delete("p1").await.unwrap();
        assert!(forms.get("f1").await.unwrap().is_none());
    }
}
