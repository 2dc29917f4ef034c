//! Projects API - /api/projects
//!
//! GET    /api/projects                     - List the caller's projects
//! POST   /api/projects                     - Create a project
//! GET    /api/projects/{id}                - Project with its forms
//! DELETE /api/projects/{id}                - Delete a project (forms cascade)
//! GET    /api/projects/{id}/forms          - List forms in a project
//! POST   /api/projects/{id}/forms          - Create a form and provision its workflow

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use canvass_core::error::FieldError;
use canvass_core::models::project::Project;
use canvass_core::state::AppState;
use canvass_core::ServerError;

use super::current_user;
use super::forms;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route("/{id}", get(get_project).delete(delete_project))
        .route(
            "/{id}/forms",
            get(forms::list_in_project).post(forms::create_in_project),
        )
}

async fn list_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ServerError> {
    let user_id = current_user(&state, &headers)?;
    let projects = state.project_store.list_by_user(&user_id).await?;
    Ok(Json(serde_json::json!({ "projects": projects })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectRequest {
    name: String,
    description: Option<String>,
}

async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServerError> {
    let user_id = current_user(&state, &headers)?;
    if body.name.trim().is_empty() {
        return Err(ServerError::Validation(vec![FieldError::new(
            "name",
            "Project name is required",
        )]));
    }

    let project = Project::new(
        uuid::Uuid::new_v4().to_string(),
        body.name,
        body.description,
        user_id,
    );
    state.project_store.create(&project).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "project": project })),
    ))
}

async fn get_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let user_id = current_user(&state, &headers)?;
    let project = state
        .project_store
        .get_owned(&id, &user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Project not found".to_string()))?;

    let forms = state.form_store.list_by_project(&id).await?;
    Ok(Json(serde_json::json!({ "project": project, "forms": forms })))
}

async fn delete_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let user_id = current_user(&state, &headers)?;
    state
        .project_store
        .get_owned(&id, &user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Project not found".to_string()))?;

    state.project_store.delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
