//! Integration tests for the canvass CLI.
//!
//! These tests verify that the CLI-facing code paths work against an
//! on-disk SQLite database, exercising the same `AppState` wiring the
//! binary uses.

use std::sync::Arc;

use canvass_core::auth::StaticAuth;
use canvass_core::engine::EngineConfig;
use canvass_core::intake;
use canvass_core::models::form::{CreateFormInput, FormStatus};
use canvass_core::models::project::Project;
use canvass_core::state::{AppState, AppStateInner};
use canvass_core::Database;

fn test_state(db_path: &str) -> AppState {
    let db = Database::open(db_path).expect("Failed to open database");
    let config = EngineConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        api_key: None,
        sheet_id: None,
    };
    Arc::new(AppStateInner::new(
        db,
        config,
        Arc::new(StaticAuth::new("local".to_string())),
    ))
}

#[tokio::test]
async fn test_project_and_draft_form_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("canvass.db");
    let db_path = db_path.to_str().unwrap();

    {
        let state = test_state(db_path);
        let project = Project::new(
            "p1".to_string(),
            "Research".to_string(),
            None,
            "local".to_string(),
        );
        state.project_store.create(&project).await.unwrap();

        let form = intake::create_draft(
            &state.project_store,
            &state.form_store,
            "local",
            "p1",
            CreateFormInput {
                name: "UX".to_string(),
                interview_topic: "mobile app".to_string(),
                system_prompt: None,
                initial_question: "What is your name?".to_string(),
                form_title: None,
                form_description: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(form.status, FormStatus::Draft);
    }

    // Reopen the same file: records survive the process boundary.
    let state = test_state(db_path);
    let projects = state.project_store.list_by_user("local").await.unwrap();
    assert_eq!(projects.len(), 1);

    let forms = state.form_store.list_by_project("p1").await.unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].name, "UX");
    assert!(forms[0].system_prompt.contains("mobile app"));
}
