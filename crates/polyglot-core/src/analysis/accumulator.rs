//! Context accumulator for user and agent messages.
//!
//! User-message mode classifies the message, builds the admin-facing note and
//! returns the updated context. Agent-message mode only folds the admin's
//! outgoing text into the context; it never produces a note.

use std::time::Duration;

use polyglot_types::conversation::Language;
use polyglot_types::error::LanguageError;

use crate::deadline::with_deadline;

use super::analyzer::{AnalysisStatus, ContextAnalyzer, UserMessageAnalysis};

/// Note text for the admin plus the context string to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNote {
    pub note: String,
    pub context: String,
}

/// Stateless wrapper that turns analyzer verdicts into notes and context.
pub struct ContextAccumulator<A: ContextAnalyzer> {
    analyzer: A,
    timeout: Duration,
}

impl<A: ContextAnalyzer> ContextAccumulator<A> {
    pub fn new(analyzer: A, timeout: Duration) -> Self {
        Self { analyzer, timeout }
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Analyze a user message and build the admin note for it.
    #[tracing::instrument(name = "accumulate_user_message", skip_all, fields(language = %language))]
    pub async fn user_message(
        &self,
        original: &str,
        context: &str,
        language: Language,
    ) -> Result<UserNote, LanguageError> {
        let analysis = with_deadline(
            self.timeout,
            self.analyzer.analyze_user_message(original, context, language),
            LanguageError::Timeout,
        )
        .await?;
        tracing::debug!(status = %analysis.status, "user message analysed");

        let note = build_admin_note(original, &analysis)?;
        Ok(UserNote {
            note,
            context: analysis.context_analysis,
        })
    }

    /// Fold an admin's outgoing message into the context.
    #[tracing::instrument(name = "accumulate_agent_message", skip_all, fields(language = %language))]
    pub async fn agent_message(
        &self,
        message: &str,
        context: &str,
        language: Language,
    ) -> Result<String, LanguageError> {
        with_deadline(
            self.timeout,
            self.analyzer.analyze_agent_message(message, context, language),
            LanguageError::Timeout,
        )
        .await
    }
}

/// Build the admin-facing note for an analysed user message.
///
/// - `no_error`: original, blank line, translation
/// - `error_fixed`: original, blank line, corrected text
/// - `uncertain`: original, blank line, translation, context, and the first two
///   interpretations (further interpretations are ignored)
pub fn build_admin_note(
    original: &str,
    analysis: &UserMessageAnalysis,
) -> Result<String, LanguageError> {
    match analysis.status {
        AnalysisStatus::NoError => Ok(format!(
            "original:{original}\n\n{}",
            analysis.translated_text
        )),
        AnalysisStatus::ErrorFixed => {
            let corrected = analysis.corrected_text.as_deref().ok_or_else(|| {
                LanguageError::ContractViolation(
                    "error_fixed analysis without corrected_text".to_string(),
                )
            })?;
            Ok(format!("original:{original}\n\n{corrected}"))
        }
        AnalysisStatus::Uncertain => match analysis.interpretations.as_slice() {
            [first, second, ..] => Ok(format!(
                "original:{original}\n\ntranslated: {}\n{}\n{first}\n{second}",
                analysis.translated_text, analysis.context_analysis
            )),
            other => Err(LanguageError::ContractViolation(format!(
                "uncertain analysis needs at least 2 interpretations, got {}",
                other.len()
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAnalyzer;

    fn analysis(status: AnalysisStatus) -> UserMessageAnalysis {
        UserMessageAnalysis {
            status,
            translated_text: "where is my order".to_string(),
            corrected_text: None,
            interpretations: Vec::new(),
            context_analysis: "user waiting on order 881".to_string(),
        }
    }

    #[test]
    fn no_error_note_uses_translation() {
        let note = build_admin_note("mera order kahan hai", &analysis(AnalysisStatus::NoError)).unwrap();
        assert_eq!(note, "original:mera order kahan hai\n\nwhere is my order");
    }

    #[test]
    fn error_fixed_note_uses_correction() {
        let mut a = analysis(AnalysisStatus::ErrorFixed);
        a.corrected_text = Some("where is my order?".to_string());
        let note = build_admin_note("mera ordr kahan", &a).unwrap();
        assert_eq!(note, "original:mera ordr kahan\n\nwhere is my order?");
    }

    #[test]
    fn error_fixed_without_correction_is_contract_violation() {
        let err = build_admin_note("x", &analysis(AnalysisStatus::ErrorFixed)).unwrap_err();
        assert!(matches!(err, LanguageError::ContractViolation(_)));
    }

    #[test]
    fn uncertain_note_uses_first_two_interpretations() {
        let mut a = analysis(AnalysisStatus::Uncertain);
        a.interpretations = vec!["A".into(), "B".into(), "C".into()];
        let note = build_admin_note("kal aana", &a).unwrap();
        assert_eq!(
            note,
            "original:kal aana\n\ntranslated: where is my order\nuser waiting on order 881\nA\nB"
        );
        assert!(!note.contains('C'));
    }

    #[test]
    fn uncertain_with_one_interpretation_is_contract_violation() {
        let mut a = analysis(AnalysisStatus::Uncertain);
        a.interpretations = vec!["A".into()];
        let err = build_admin_note("kal aana", &a).unwrap_err();
        assert!(matches!(err, LanguageError::ContractViolation(_)));
    }

    #[tokio::test]
    async fn user_message_returns_note_and_updated_context() {
        let accumulator = ContextAccumulator::new(MockAnalyzer::default(), Duration::from_secs(5));
        let out = accumulator
            .user_message("mera order", "ctx", Language::Hinglish)
            .await
            .unwrap();
        assert_eq!(out.note, "original:mera order\n\n[en] mera order");
        assert_eq!(out.context, "ctx+user:mera order");
        assert_eq!(accumulator.analyzer().user_calls(), 1);
    }

    #[tokio::test]
    async fn agent_message_only_updates_context() {
        let accumulator = ContextAccumulator::new(MockAnalyzer::default(), Duration::from_secs(5));
        let context = accumulator
            .agent_message("refund in 3 days", "ctx", Language::Hindi)
            .await
            .unwrap();
        assert_eq!(context, "ctx+agent:refund in 3 days");
        assert_eq!(accumulator.analyzer().agent_calls(), 1);
        assert_eq!(accumulator.analyzer().user_calls(), 0);
    }
}
