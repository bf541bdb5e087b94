//! ContextAnalyzer trait definition.
//!
//! The classification itself belongs to an external LLM collaborator. This
//! module only fixes the shape of what it returns.

use polyglot_types::conversation::Language;
use polyglot_types::error::LanguageError;
use serde::{Deserialize, Serialize};

use std::fmt;

/// Verdict on a user message's clarity and correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// The message is clear; the translation stands on its own.
    NoError,
    /// The message had an error that the analyzer corrected.
    ErrorFixed,
    /// The message is ambiguous; see `interpretations`.
    Uncertain,
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisStatus::NoError => write!(f, "no_error"),
            AnalysisStatus::ErrorFixed => write!(f, "error_fixed"),
            AnalysisStatus::Uncertain => write!(f, "uncertain"),
        }
    }
}

/// Analyzer output for a user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessageAnalysis {
    pub status: AnalysisStatus,
    /// English translation of the message.
    pub translated_text: String,
    /// Corrected English text. Present when `status` is `ErrorFixed`.
    #[serde(default)]
    pub corrected_text: Option<String>,
    /// Candidate readings. At least two when `status` is `Uncertain`.
    #[serde(default)]
    pub interpretations: Vec<String>,
    /// Updated rolling context summary.
    #[serde(default)]
    pub context_analysis: String,
}

/// Trait for the LLM collaborator that interprets messages in context.
pub trait ContextAnalyzer: Send + Sync {
    /// Classify a user message written in `language`, given the rolling context.
    fn analyze_user_message(
        &self,
        message: &str,
        context: &str,
        language: Language,
    ) -> impl std::future::Future<Output = Result<UserMessageAnalysis, LanguageError>> + Send;

    /// Fold an admin's outgoing message into the rolling context.
    ///
    /// Returns the updated context (open issues, resolutions, promises, timeframes).
    fn analyze_agent_message(
        &self,
        message: &str,
        context: &str,
        language: Language,
    ) -> impl std::future::Future<Output = Result<String, LanguageError>> + Send;
}
