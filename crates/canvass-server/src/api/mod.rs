pub mod forms;
pub mod hooks;
pub mod projects;

use axum::http::HeaderMap;
use axum::Router;

use canvass_core::state::AppState;
use canvass_core::ServerError;

/// Build the complete API router with all sub-routes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/projects", projects::router())
        .nest("/api/forms", forms::router())
        .nest("/api/hooks", hooks::router())
}

/// Resolve the calling user through the injected auth capability.
pub(crate) fn current_user(state: &AppState, headers: &HeaderMap) -> Result<String, ServerError> {
    let bearer = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    state.auth.authenticate(bearer)
}
