//! Records emitted after an event has been routed.
//!
//! `ProcessingResult` is written for every successfully handled event (except
//! conversation closure). `DomainException` carries enough context to
//! reconstruct a failed operation during a postmortem.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest message excerpt stored in exception params.
pub const MAX_EXCERPT_CHARS: usize = 200;

/// Outcome record for a routed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub is_success: bool,
    pub event_type: String,
    /// Handler wall-clock duration in seconds.
    pub execution_time: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl ProcessingResult {
    pub fn success(event_type: impl Into<String>, execution_time: f64) -> Self {
        Self {
            is_success: true,
            event_type: event_type.into(),
            execution_time: Some(execution_time),
            timestamp: Utc::now(),
        }
    }
}

/// A classified failure raised while handling an event.
///
/// Params hold identifiers and short message excerpts only, never credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{exception_class} in {event_type}: {message}")]
pub struct DomainException {
    pub message: String,
    pub exception_class: String,
    pub event_type: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl DomainException {
    pub fn new(
        exception_class: impl Into<String>,
        message: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            exception_class: exception_class.into(),
            event_type: event_type.into(),
            params: BTreeMap::new(),
            stack_trace: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a parameter describing the failed operation.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Attach a message excerpt, truncated to [`MAX_EXCERPT_CHARS`].
    pub fn with_excerpt(self, key: impl Into<String>, text: &str) -> Self {
        self.with_param(key, excerpt(text))
    }

    pub fn with_stack_trace(mut self, trace: impl Into<String>) -> Self {
        self.stack_trace = Some(trace.into());
        self
    }
}

/// Truncate text on a char boundary for inclusion in logs and params.
pub fn excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
