//! Intercom webhook receiver.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Serialize;

use crate::http::error::AppError;
use crate::state::AppState;

/// Acknowledgement body for a delivered event.
#[derive(Debug, Serialize)]
pub struct WebhookReceipt {
    pub status: &'static str,
}

/// POST /webhooks/intercom - Receive one conversation event.
///
/// Every classified outcome (processed, duplicate, malformed, ignored,
/// failed) is acknowledged with 200 so the sender does not redeliver.
/// Only an unclassified handler failure answers 500.
///
/// Intake runs on its own task: the event id is reserved before routing, so
/// processing must finish even if the sender hangs up mid-request.
pub async fn receive_intercom(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookReceipt>, AppError> {
    let intake = Arc::clone(&state.intake);
    let outcome = tokio::spawn(async move { intake.accept(&body).await }).await??;
    Ok(Json(WebhookReceipt {
        status: outcome.status(),
    }))
}
