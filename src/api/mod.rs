//! HTTP API.
//!
//! Routes:
//! - `GET /api/v1/reply-tracker` - tracked emails for the caller's account
//! - `GET /health` - liveness probe

pub mod auth;
mod error;
mod reply_tracker;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use reply_tracker::ReplyTrackerParams;

use crate::providers::email::ProviderFactory;
use crate::storage::Database;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Connects to the mailbox of an authenticated caller.
    pub providers: Arc<dyn ProviderFactory>,
}

impl AppState {
    pub fn new(db: Database, providers: Arc<dyn ProviderFactory>) -> Self {
        Self { db, providers }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/reply-tracker", get(reply_tracker::get_reply_tracker))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
