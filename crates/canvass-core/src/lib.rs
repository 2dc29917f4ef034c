//! Canvass Core — transport-agnostic domain logic for the Canvass platform.
//!
//! This crate contains the data models, stores, interview-workflow
//! generation, and the automation-engine client. It has **no HTTP framework
//! dependency** by default, making it suitable for use in:
//!
//! - HTTP servers (via `canvass-server`)
//! - CLI tools
//!
//! # Feature Flags
//!
//! - `axum` — Enables `IntoResponse` impl on `ServerError` for use in axum handlers.

pub mod auth;
pub mod db;
pub mod engine;
pub mod error;
pub mod intake;
pub mod models;
pub mod prompt;
pub mod provision;
pub mod state;
pub mod store;
pub mod workflow;

// Convenience re-exports
pub use db::Database;
pub use error::ServerError;
pub use state::{AppState, AppStateInner};
