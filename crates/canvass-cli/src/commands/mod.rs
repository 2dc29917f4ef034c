//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and reuses the
//! canvass-core domain logic through `AppState`.

pub mod form;
pub mod project;
pub mod server;

use std::sync::Arc;

use canvass_core::auth;
use canvass_core::engine::EngineConfig;
use canvass_core::state::{AppState, AppStateInner};

/// Initialize a shared `AppState` from the given SQLite database path.
///
/// This mirrors `canvass_server::create_app_state` but avoids pulling in
/// the HTTP server bootstrap for non-server commands.
pub fn init_state(db_path: &str) -> AppState {
    let db = canvass_core::Database::open(db_path).unwrap_or_else(|e| {
        eprintln!("Failed to open database '{}': {}", db_path, e);
        std::process::exit(1);
    });

    Arc::new(AppStateInner::new(db, EngineConfig::from_env(), auth::from_env()))
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}
