//! Axum router configuration with middleware.
//!
//! Routes:
//! - `POST /webhooks/intercom`: event intake
//! - `GET /health`: liveness
//!
//! Middleware: tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the webhook router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/intercom", post(handlers::webhook::receive_intercom))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
