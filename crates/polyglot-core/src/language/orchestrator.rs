//! Target-language dispatch over a `TranslationService`.
//!
//! Stateless apart from the wrapped service. No retries: a failed or timed-out
//! call is returned to the caller as a `LanguageError`.

use std::time::Duration;

use polyglot_types::conversation::{DetectedLanguage, Language};
use polyglot_types::error::LanguageError;

use crate::deadline::with_deadline;

use super::service::TranslationService;

/// Routes translation requests to the matching directional operation.
pub struct TranslationOrchestrator<T: TranslationService> {
    service: T,
    timeout: Duration,
}

impl<T: TranslationService> TranslationOrchestrator<T> {
    /// Create an orchestrator bounding every call by `timeout`.
    pub fn new(service: T, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Access the underlying service.
    pub fn service(&self) -> &T {
        &self.service
    }

    /// Translate English `text` into `target`.
    ///
    /// English needs no translation and makes no remote call.
    #[tracing::instrument(name = "translate", skip(self, text))]
    pub async fn translate(&self, text: &str, target: Language) -> Result<String, LanguageError> {
        let call = async {
            match target {
                Language::English => Ok(text.to_string()),
                Language::Hindi => self.service.english_to_hindi(text).await,
                Language::Hinglish => self.service.english_to_hinglish(text).await,
                Language::Bengali => self.service.english_to_bengali(text).await,
            }
        };
        with_deadline(self.timeout, call, LanguageError::Timeout).await
    }

    /// Detect the language of `text`.
    #[tracing::instrument(name = "detect_language", skip(self, text))]
    pub async fn detect(&self, text: &str) -> Result<DetectedLanguage, LanguageError> {
        let detected =
            with_deadline(self.timeout, self.service.detect(text), LanguageError::Timeout).await?;
        tracing::debug!(%detected, "language detected");
        Ok(detected)
    }
}
