//! Forms API - /api/forms (plus the project-scoped creation route)
//!
//! POST   /api/projects/{projectId}/forms   - Create a form (core operation)
//! GET    /api/projects/{projectId}/forms   - List forms in a project
//! GET    /api/forms/{id}                   - Form with response count
//! POST   /api/forms/{id}/activate          - Retry workflow provisioning
//! DELETE /api/forms/{id}                   - Decommission workflow + delete
//! GET    /api/forms/{id}/responses         - List recorded responses

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};

use canvass_core::intake;
use canvass_core::models::form::{CreateFormInput, Form};
use canvass_core::provision;
use canvass_core::state::AppState;
use canvass_core::ServerError;

use super::current_user;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(get_form).delete(delete_form))
        .route("/{id}/activate", post(activate_form))
        .route("/{id}/responses", get(list_responses))
}

// ─── Project-scoped routes (mounted under /api/projects) ────────────────────

/// POST /api/projects/{projectId}/forms — create a form, provision its
/// workflow, and answer 201 either way once the row exists. A provisioning
/// failure is reported in the `error` field of the body, not as a failure
/// status.
pub(crate) async fn create_in_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Json(input): Json<CreateFormInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServerError> {
    let user_id = current_user(&state, &headers)?;

    let created = intake::create_form(
        &state.project_store,
        &state.form_store,
        &state.engine,
        &user_id,
        &project_id,
        input,
    )
    .await?;

    let mut body = serde_json::to_value(&created.form)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    if let Some(note) = created.workflow_error {
        body["error"] = serde_json::Value::String(note);
    }
    Ok((StatusCode::CREATED, Json(body)))
}

pub(crate) async fn list_in_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let user_id = current_user(&state, &headers)?;
    state
        .project_store
        .get_owned(&project_id, &user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Project not found".to_string()))?;

    let forms = state.form_store.list_by_project(&project_id).await?;
    Ok(Json(serde_json::json!({ "forms": forms })))
}

// ─── Form-scoped routes ──────────────────────────────────────────────────────

async fn get_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let form = owned_form(&state, &headers, &id).await?;
    let response_count = state.form_store.response_count(&form.id).await?;
    Ok(Json(
        serde_json::json!({ "form": form, "responseCount": response_count }),
    ))
}

/// POST /api/forms/{id}/activate — idempotent retry of the pending workflow
/// transition. Unlike creation, a failure here IS the operation failing and
/// surfaces as an error status.
async fn activate_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let form = owned_form(&state, &headers, &id).await?;
    if form.is_active() {
        return Ok(Json(serde_json::json!({ "form": form })));
    }

    let (form, note) =
        provision::sync_form_workflow(&state.form_store, &state.engine, form).await?;
    match note {
        None => Ok(Json(serde_json::json!({ "form": form }))),
        Some(note) => Err(ServerError::Internal(note)),
    }
}

/// DELETE /api/forms/{id} — remove the engine workflow first, then the row.
/// A failed engine delete aborts the operation and leaves the row in place.
async fn delete_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let form = owned_form(&state, &headers, &id).await?;

    if let Some(workflow_id) = &form.workflow_id {
        provision::decommission(&state.engine, workflow_id)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to delete workflow: {}", e)))?;
    }

    state.form_store.delete(&form.id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn list_responses(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let form = owned_form(&state, &headers, &id).await?;
    let responses = state.response_store.list_by_form(&form.id).await?;
    Ok(Json(serde_json::json!({ "responses": responses })))
}

/// Fetch a form only when its project belongs to the caller. Missing and
/// not-owned are indistinguishable to the caller.
async fn owned_form(
    state: &AppState,
    headers: &HeaderMap,
    form_id: &str,
) -> Result<Form, ServerError> {
    let user_id = current_user(state, headers)?;
    let form = state
        .form_store
        .get(form_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Form {} not found", form_id)))?;

    state
        .project_store
        .get_owned(&form.project_id, &user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Form {} not found", form_id)))?;

    Ok(form)
}
