//! Shared application state for the axum server and CLI.

use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::db::Database;
use crate::engine::{EngineClient, EngineConfig};
use crate::store::{FormStore, ProjectStore, ResponseStore};

/// Shared state accessible by all API handlers.
pub struct AppStateInner {
    pub db: Database,
    pub project_store: ProjectStore,
    pub form_store: FormStore,
    pub response_store: ResponseStore,
    pub engine: EngineClient,
    pub auth: Arc<dyn AuthProvider>,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn new(db: Database, engine_config: EngineConfig, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            project_store: ProjectStore::new(db.clone()),
            form_store: FormStore::new(db.clone()),
            response_store: ResponseStore::new(db.clone()),
            engine: EngineClient::new(engine_config),
            auth,
            db,
        }
    }
}
