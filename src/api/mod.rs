//! HTTP surface built on axum.
//!
//! Routes are grouped per bounded context and mounted under `/api`:
//!
//! - `/api/auth` for accounts and bearer tokens
//! - `/api/projects` for projects, their members, files, links, activity
//!   and topics
//! - `/api/ideas` for ideas and their notes, resources and members
//! - `/api/tasks` for tasks, task lists and templates
//!
//! Every route except registration, sign-in and `/health` requires an
//! `Authorization: Bearer <token>` header.

pub mod auth;
pub mod error;
pub mod extract;
pub mod ideas;
pub mod projects;
pub mod state;
mod task_lists;
mod tasks;
mod templates;
mod topics;
pub mod views;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, Repositories};

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Builds the complete application router.
///
/// Request bodies larger than `max_upload_bytes` are rejected with 413
/// before they reach a handler.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let task_routes = tasks::routes()
        .merge(task_lists::routes())
        .merge(templates::routes());
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth::routes())
        .nest("/api/projects", projects::routes())
        .nest("/api/ideas", ideas::routes())
        .nest("/api/tasks", task_routes)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
