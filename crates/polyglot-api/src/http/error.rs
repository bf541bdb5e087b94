//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use polyglot_core::router::RouteError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// A handler failed in a way that was not classified. The event id stays
    /// reserved, so a redelivery is acknowledged as a duplicate.
    Route(RouteError),
    /// The intake task panicked or was cancelled.
    Task(tokio::task::JoinError),
}

impl From<RouteError> for AppError {
    fn from(e: RouteError) -> Self {
        AppError::Route(e)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Task(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Route(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UNCLASSIFIED_FAILURE",
                e.to_string(),
            ),
            AppError::Task(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTAKE_TASK_FAILED",
                e.to_string(),
            ),
        };

        let body = json!({
            "status": "error",
            "error": {
                "code": code,
                "message": message,
            }
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
