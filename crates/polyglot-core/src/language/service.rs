//! TranslationService trait definition.
//!
//! Every operation is a text-in/text-out remote call that may be slow or fail.
//! Implementations live in polyglot-infra.

use polyglot_types::conversation::DetectedLanguage;
use polyglot_types::error::LanguageError;

/// Trait for the translation/detection backend.
pub trait TranslationService: Send + Sync {
    fn english_to_hindi(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<String, LanguageError>> + Send;

    fn english_to_hinglish(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<String, LanguageError>> + Send;

    fn english_to_bengali(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<String, LanguageError>> + Send;

    /// Translate from any supported language into English.
    fn to_english(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<String, LanguageError>> + Send;

    fn detect(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<DetectedLanguage, LanguageError>> + Send;
}
