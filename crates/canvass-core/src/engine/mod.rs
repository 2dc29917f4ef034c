//! Client for the external workflow-automation engine (n8n-compatible
//! REST API).
//!
//! Workflows are created inactive, then activated with a second call; the
//! engine authenticates every request through the `X-N8N-API-KEY` header.

use std::time::Duration;

use serde_json::{json, Value};

use crate::workflow::WorkflowGraph;

pub const API_KEY_HEADER: &str = "X-N8N-API-KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the automation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Preconfigured spreadsheet the engine appends results to
    /// (pass-through only, never generated here).
    pub sheet_id: Option<String>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("N8N_API_URL")
                .unwrap_or_else(|_| "http://localhost:5678".to_string()),
            api_key: std::env::var("N8N_API_KEY").ok(),
            sheet_id: std::env::var("GOOGLE_SHEET_ID").ok(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("N8N_API_KEY is not configured")]
    MissingApiKey,

    #[error("Engine request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Engine returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Workflow graph has no trigger node")]
    MissingTrigger,
}

/// Thin REST client for the engine's workflow API.
#[derive(Clone)]
pub struct EngineClient {
    http: reqwest::Client,
    config: EngineConfig,
}

impl EngineClient {
    pub fn new(config: EngineConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, config }
    }

    fn api_key(&self) -> Result<&str, EngineError> {
        self.config.api_key.as_deref().ok_or(EngineError::MissingApiKey)
    }

    fn workflows_url(&self) -> String {
        format!("{}/api/v1/workflows", self.config.base_url)
    }

    /// Submit a workflow (initially inactive). Returns the engine-assigned
    /// workflow id.
    pub async fn create_workflow(&self, graph: &WorkflowGraph) -> Result<String, EngineError> {
        let key = self.api_key()?.to_string();
        let resp = self
            .http
            .post(self.workflows_url())
            .header(API_KEY_HEADER, key)
            .json(&workflow_payload(graph))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let created: Value = resp.json().await?;
        created
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| EngineError::Api {
                status: status.as_u16(),
                body: "response missing workflow id".to_string(),
            })
    }

    /// Flip a created workflow to active.
    pub async fn activate_workflow(&self, workflow_id: &str) -> Result<(), EngineError> {
        let key = self.api_key()?.to_string();
        let resp = self
            .http
            .patch(format!("{}/{}", self.workflows_url(), workflow_id))
            .header(API_KEY_HEADER, key)
            .json(&json!({ "active": true }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Remove a workflow from the engine.
    pub async fn delete_workflow(&self, workflow_id: &str) -> Result<(), EngineError> {
        let key = self.api_key()?.to_string();
        let resp = self
            .http
            .delete(format!("{}/{}", self.workflows_url(), workflow_id))
            .header(API_KEY_HEADER, key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Public URL respondents use to start an interview.
    pub fn form_url(&self, webhook_path: &str) -> String {
        format!("{}/form/{}", self.config.base_url, webhook_path)
    }

    /// Configured spreadsheet linkage as (id, url).
    pub fn sheet_linkage(&self) -> (Option<String>, Option<String>) {
        let id = self.config.sheet_id.clone();
        let url = id
            .as_ref()
            .map(|id| format!("https://docs.google.com/spreadsheets/d/{}", id));
        (id, url)
    }
}

/// The create-workflow request body: named graph plus execution settings,
/// submitted inactive. Error and success data are kept, progress snapshots
/// and manual executions are not.
fn workflow_payload(graph: &WorkflowGraph) -> Value {
    let wire = graph.to_wire();
    json!({
        "name": graph.name,
        "nodes": wire["nodes"],
        "connections": wire["connections"],
        "settings": {
            "saveDataErrorExecution": "all",
            "saveDataSuccessExecution": "all",
            "saveExecutionProgress": false,
            "saveManualExecutions": false,
        },
        "active": false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::Form;

    fn client(api_key: Option<&str>) -> EngineClient {
        EngineClient::new(EngineConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: api_key.map(str::to_string),
            sheet_id: Some("sheet-1".to_string()),
        })
    }

    fn test_form() -> Form {
        Form::new(
            "f1".to_string(),
            "p1".to_string(),
            "UX".to_string(),
            "mobile app".to_string(),
            "prompt".to_string(),
            "Your name?".to_string(),
            None,
            None,
        )
    }

    #[test]
    fn test_form_url() {
        assert_eq!(
            client(None).form_url("interview-f1"),
            "http://127.0.0.1:1/form/interview-f1"
        );
    }

    #[test]
    fn test_sheet_linkage() {
        let (id, url) = client(None).sheet_linkage();
        assert_eq!(id.as_deref(), Some("sheet-1"));
        assert_eq!(
            url.as_deref(),
            Some("https://docs.google.com/spreadsheets/d/sheet-1")
        );
    }

    #[test]
    fn test_workflow_payload_shape() {
        let graph = crate::workflow::WorkflowGraph::interview(&test_form());
        let payload = workflow_payload(&graph);
        assert_eq!(payload["name"], "UX - Interview Form");
        assert_eq!(payload["active"], false);
        assert_eq!(payload["settings"]["saveDataErrorExecution"], "all");
        assert_eq!(payload["settings"]["saveExecutionProgress"], false);
        assert_eq!(payload["nodes"].as_array().unwrap().len(), 7);
        assert!(payload["connections"].get(crate::workflow::TRIGGER_NODE).is_some());
    }

    #[tokio::test]
    async fn test_calls_require_api_key() {
        let client = client(None);
        let graph = crate::workflow::WorkflowGraph::interview(&test_form());
        assert!(matches!(
            client.create_workflow(&graph).await.unwrap_err(),
            EngineError::MissingApiKey
        ));
        assert!(matches!(
            client.activate_workflow("wf-1").await.unwrap_err(),
            EngineError::MissingApiKey
        ));
        assert!(matches!(
            client.delete_workflow("wf-1").await.unwrap_err(),
            EngineError::MissingApiKey
        ));
    }
}
