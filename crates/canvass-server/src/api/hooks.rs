//! Engine callbacks - /api/hooks
//!
//! Unauthenticated endpoints the automation engine calls back into once a
//! respondent finishes an interview.
//!
//! POST /api/hooks/forms/{formId}/responses - Record a completed interview

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use canvass_core::models::response::Response;
use canvass_core::state::AppState;
use canvass_core::ServerError;

pub fn router() -> Router<AppState> {
    Router::new().route("/forms/{id}/responses", post(record_response))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordResponseRequest {
    respondent: Option<String>,
    #[serde(default)]
    answers: serde_json::Value,
}

async fn record_response(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RecordResponseRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServerError> {
    let form = state
        .form_store
        .get(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Form {} not found", id)))?;

    let response = Response::new(
        uuid::Uuid::new_v4().to_string(),
        form.id,
        body.respondent,
        body.answers,
    );
    state.response_store.append(&response).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "response": response })),
    ))
}
