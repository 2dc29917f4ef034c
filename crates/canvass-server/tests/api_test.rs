//! Integration tests: start the backend server and verify API endpoints.
//!
//! These tests exercise the same code paths as the binary, using in-memory
//! SQLite databases for isolation. Engine round trips are served by a local
//! axum stub, so no test touches the network.

use std::sync::Arc;
use std::time::Duration;

use canvass_core::auth::StaticAuth;
use canvass_core::db::Database;
use canvass_core::engine::EngineConfig;
use canvass_core::models::project::Project;
use canvass_core::state::{AppState, AppStateInner};

/// Create an `AppState` over the given database, as user "tester".
fn test_state(db: Database, engine_base: &str, api_key: Option<&str>) -> AppState {
    let config = EngineConfig {
        base_url: engine_base.to_string(),
        api_key: api_key.map(str::to_string),
        sheet_id: None,
    };
    Arc::new(AppStateInner::new(
        db,
        config,
        Arc::new(StaticAuth::new("tester".to_string())),
    ))
}

/// Serve the API router for a state on a random port.
async fn spawn_api(state: AppState) -> String {
    let app = axum::Router::new()
        .merge(canvass_server::api::api_router())
        .route(
            "/api/health",
            axum::routing::get(|| async { axum::Json(serde_json::json!({"status": "ok"})) }),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://{}", addr)
}

/// Minimal automation-engine stand-in: accepts workflow create, activate,
/// and delete calls the way the real REST API does.
async fn spawn_stub_engine() -> String {
    use axum::routing::{patch, post};

    let app = axum::Router::new()
        .route(
            "/api/v1/workflows",
            post(|axum::Json(body): axum::Json<serde_json::Value>| async move {
                assert_eq!(body["active"], false);
                assert_eq!(body["nodes"].as_array().unwrap().len(), 7);
                axum::Json(serde_json::json!({ "id": "wf-123" }))
            }),
        )
        .route(
            "/api/v1/workflows/{id}",
            patch(|| async { axum::Json(serde_json::json!({ "active": true })) })
                .delete(|| async { axum::Json(serde_json::json!({})) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://{}", addr)
}

async fn create_project(client: &reqwest::Client, base: &str) -> String {
    let resp = client
        .post(format!("{}/api/projects", base))
        .json(&serde_json::json!({ "name": "Research" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = resp.json().await.unwrap();
    body["project"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_and_project_crud() {
    let db = Database::open_in_memory().unwrap();
    let base = spawn_api(test_state(db, "http://127.0.0.1:1", None)).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{}/api/health", base)).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let project_id = create_project(&client, &base).await;

    let resp = client.get(format!("{}/api/projects", base)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    let projects = body["projects"].as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["name"], "Research");

    let resp = client
        .get(format!("{}/api/projects/{}", base, project_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["forms"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_form_provisions_workflow() {
    let engine_base = spawn_stub_engine().await;
    let db = Database::open_in_memory().unwrap();
    let base = spawn_api(test_state(db, &engine_base, Some("test-key"))).await;
    let client = reqwest::Client::new();

    let project_id = create_project(&client, &base).await;

    let resp = client
        .post(format!("{}/api/projects/{}/forms", base, project_id))
        .json(&serde_json::json!({
            "name": "UX",
            "interviewTopic": "mobile app",
            "initialQuestion": "Your name?"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let form: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(form["status"], "active");
    assert_eq!(form["workflowId"], "wf-123");
    assert_eq!(form["initialQuestion"], "Your name?");
    assert_eq!(form["formTitle"], "UX");
    assert!(form.get("error").is_none());

    let form_id = form["id"].as_str().unwrap();
    assert_eq!(
        form["webhookUrl"],
        format!("{}/form/interview-{}", engine_base, form_id)
    );

    let prompt = form["systemPrompt"].as_str().unwrap();
    assert!(prompt.contains("mobile app"));
    assert!(prompt.contains("\"stop_interview\": false"));
}

#[tokio::test]
async fn test_create_form_without_engine_key_is_partial_success() {
    let db = Database::open_in_memory().unwrap();
    let base = spawn_api(test_state(db, "http://127.0.0.1:1", None)).await;
    let client = reqwest::Client::new();

    let project_id = create_project(&client, &base).await;

    let resp = client
        .post(format!("{}/api/projects/{}/forms", base, project_id))
        .json(&serde_json::json!({ "name": "UX", "interviewTopic": "mobile app" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let form: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(form["status"], "workflow_failed");
    assert!(form.get("workflowId").is_none());
    assert!(form.get("webhookUrl").is_none());
    assert!(form["error"].as_str().unwrap().contains("workflow generation failed"));

    // The row exists and shows up in the project listing.
    let resp = client
        .get(format!("{}/api/projects/{}/forms", base, project_id))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["forms"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_form_validates_fields() {
    let db = Database::open_in_memory().unwrap();
    let base = spawn_api(test_state(db, "http://127.0.0.1:1", None)).await;
    let client = reqwest::Client::new();

    let project_id = create_project(&client, &base).await;

    let resp = client
        .post(format!("{}/api/projects/{}/forms", base, project_id))
        .json(&serde_json::json!({ "name": "", "interviewTopic": "mobile app" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid data");
    assert_eq!(body["details"][0]["field"], "name");

    // Nothing was persisted.
    let resp = client
        .get(format!("{}/api/projects/{}/forms", base, project_id))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["forms"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_form_in_unowned_project_is_not_found() {
    let db = Database::open_in_memory().unwrap();
    let state = test_state(db, "http://127.0.0.1:1", None);

    // A project owned by someone other than the authenticated "tester".
    state
        .project_store
        .create(&Project::new(
            "foreign".to_string(),
            "Other".to_string(),
            None,
            "someone-else".to_string(),
        ))
        .await
        .unwrap();

    let base = spawn_api(state.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/projects/foreign/forms", base))
        .json(&serde_json::json!({ "name": "UX", "interviewTopic": "mobile app" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    assert!(state.form_store.list_by_project("foreign").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_activate_retries_failed_workflow() {
    let engine_base = spawn_stub_engine().await;
    let db = Database::open_in_memory().unwrap();

    // Two states over the same database: one without a credential (fails),
    // one pointed at the stub engine (succeeds on retry).
    let broken = test_state(db.clone(), "http://127.0.0.1:1", None);
    let working = test_state(db, &engine_base, Some("test-key"));

    let broken_base = spawn_api(broken).await;
    let working_base = spawn_api(working).await;
    let client = reqwest::Client::new();

    let project_id = create_project(&client, &broken_base).await;
    let resp = client
        .post(format!("{}/api/projects/{}/forms", broken_base, project_id))
        .json(&serde_json::json!({ "name": "UX", "interviewTopic": "mobile app" }))
        .send()
        .await
        .unwrap();
    let form: serde_json::Value = resp.json().await.unwrap();
    let form_id = form["id"].as_str().unwrap();
    assert_eq!(form["status"], "workflow_failed");

    // Retrying against the broken engine surfaces the failure.
    let resp = client
        .post(format!("{}/api/forms/{}/activate", broken_base, form_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    // Retrying against the working engine completes the pending transition.
    let resp = client
        .post(format!("{}/api/forms/{}/activate", working_base, form_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["form"]["status"], "active");
    assert_eq!(body["form"]["workflowId"], "wf-123");

    // A second activate is a no-op.
    let resp = client
        .post(format!("{}/api/forms/{}/activate", working_base, form_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_response_callback_and_count() {
    let engine_base = spawn_stub_engine().await;
    let db = Database::open_in_memory().unwrap();
    let base = spawn_api(test_state(db, &engine_base, Some("test-key"))).await;
    let client = reqwest::Client::new();

    let project_id = create_project(&client, &base).await;
    let resp = client
        .post(format!("{}/api/projects/{}/forms", base, project_id))
        .json(&serde_json::json!({ "name": "UX", "interviewTopic": "mobile app" }))
        .send()
        .await
        .unwrap();
    let form: serde_json::Value = resp.json().await.unwrap();
    let form_id = form["id"].as_str().unwrap();

    let resp = client
        .post(format!("{}/api/hooks/forms/{}/responses", base, form_id))
        .json(&serde_json::json!({
            "respondent": "Sam Smith",
            "answers": { "Your name?": "Sam Smith", "q2": "it crashes a lot" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = client
        .get(format!("{}/api/forms/{}", base, form_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["responseCount"], 1);

    let resp = client
        .get(format!("{}/api/forms/{}/responses", base, form_id))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["responses"][0]["respondent"], "Sam Smith");
}

#[tokio::test]
async fn test_delete_form_decommissions_workflow() {
    let engine_base = spawn_stub_engine().await;
    let db = Database::open_in_memory().unwrap();
    let base = spawn_api(test_state(db, &engine_base, Some("test-key"))).await;
    let client = reqwest::Client::new();

    let project_id = create_project(&client, &base).await;
    let resp = client
        .post(format!("{}/api/projects/{}/forms", base, project_id))
        .json(&serde_json::json!({ "name": "UX", "interviewTopic": "mobile app" }))
        .send()
        .await
        .unwrap();
    let form: serde_json::Value = resp.json().await.unwrap();
    let form_id = form["id"].as_str().unwrap();

    let resp = client
        .delete(format!("{}/api/forms/{}", base, form_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["deleted"], true);

    let resp = client
        .get(format!("{}/api/forms/{}", base, form_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
