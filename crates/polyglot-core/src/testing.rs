//! Hand-written collaborators shared by the core test modules.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use polyglot_types::conversation::{DetectedLanguage, Language};
use polyglot_types::error::{CacheError, LanguageError, MessagingError};
use polyglot_types::result::{DomainException, ProcessingResult};

use crate::analysis::{AnalysisStatus, ContextAnalyzer, UserMessageAnalysis};
use crate::cache::Cache;
use crate::language::TranslationService;
use crate::messaging::MessagingClient;
use crate::sink::{ResultSink, SinkError};

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// Translator that prefixes outputs with a language tag and records calls.
pub struct MockTranslator {
    calls: Mutex<Vec<String>>,
    detected: DetectedLanguage,
    fail: bool,
    delay: Option<Duration>,
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            detected: DetectedLanguage::Hinglish,
            fail: false,
            delay: None,
        }
    }
}

impl MockTranslator {
    pub fn detecting(detected: DetectedLanguage) -> Self {
        Self {
            detected,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn call(&self, name: &str) -> Result<(), LanguageError> {
        self.calls.lock().unwrap().push(name.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(LanguageError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(())
    }
}

impl TranslationService for MockTranslator {
    async fn english_to_hindi(&self, text: &str) -> Result<String, LanguageError> {
        self.call("english_to_hindi").await?;
        Ok(format!("[hi] {text}"))
    }

    async fn english_to_hinglish(&self, text: &str) -> Result<String, LanguageError> {
        self.call("english_to_hinglish").await?;
        Ok(format!("[hinglish] {text}"))
    }

    async fn english_to_bengali(&self, text: &str) -> Result<String, LanguageError> {
        self.call("english_to_bengali").await?;
        Ok(format!("[bn] {text}"))
    }

    async fn to_english(&self, text: &str) -> Result<String, LanguageError> {
        self.call("to_english").await?;
        Ok(format!("[en] {text}"))
    }

    async fn detect(&self, _text: &str) -> Result<DetectedLanguage, LanguageError> {
        self.call("detect").await?;
        Ok(self.detected)
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Analyzer returning a `no_error` verdict unless configured otherwise.
///
/// Context strings grow as `"{context}+user:{message}"` and
/// `"{context}+agent:{message}"` so tests can see what was folded in.
#[derive(Default)]
pub struct MockAnalyzer {
    user_calls: AtomicUsize,
    agent_calls: AtomicUsize,
    languages: Mutex<Vec<Language>>,
    verdict: Option<UserMessageAnalysis>,
    error: Option<fn() -> LanguageError>,
}

impl MockAnalyzer {
    /// Always return `analysis` for user messages.
    pub fn returning(analysis: UserMessageAnalysis) -> Self {
        Self {
            verdict: Some(analysis),
            ..Self::default()
        }
    }

    /// Fail every call with the error built by `error`.
    pub fn failing(error: fn() -> LanguageError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    pub fn agent_calls(&self) -> usize {
        self.agent_calls.load(Ordering::SeqCst)
    }

    /// Languages passed to every call, in order.
    pub fn languages(&self) -> Vec<Language> {
        self.languages.lock().unwrap().clone()
    }
}

impl ContextAnalyzer for MockAnalyzer {
    async fn analyze_user_message(
        &self,
        message: &str,
        context: &str,
        language: Language,
    ) -> Result<UserMessageAnalysis, LanguageError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.languages.lock().unwrap().push(language);
        if let Some(error) = self.error {
            return Err(error());
        }
        Ok(self.verdict.clone().unwrap_or_else(|| UserMessageAnalysis {
            status: AnalysisStatus::NoError,
            translated_text: format!("[en] {message}"),
            corrected_text: None,
            interpretations: Vec::new(),
            context_analysis: format!("{context}+user:{message}"),
        }))
    }

    async fn analyze_agent_message(
        &self,
        message: &str,
        context: &str,
        language: Language,
    ) -> Result<String, LanguageError> {
        self.agent_calls.fetch_add(1, Ordering::SeqCst);
        self.languages.lock().unwrap().push(language);
        if let Some(error) = self.error {
            return Err(error());
        }
        Ok(format!("{context}+agent:{message}"))
    }
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

/// One posted note or message: `(conversation_id, admin_id, text)`.
pub type Posted = (String, String, String);

/// Messaging client that records what it was asked to post.
#[derive(Default)]
pub struct MockMessaging {
    notes: Mutex<Vec<Posted>>,
    messages: Mutex<Vec<Posted>>,
    fail: bool,
}

impl MockMessaging {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn notes(&self) -> Vec<Posted> {
        self.notes.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<Posted> {
        self.messages.lock().unwrap().clone()
    }

    fn post(
        &self,
        target: &Mutex<Vec<Posted>>,
        conversation_id: &str,
        admin_id: &str,
        text: &str,
    ) -> Result<(), MessagingError> {
        if self.fail {
            return Err(MessagingError::Status {
                status: 500,
                body: "server error".into(),
            });
        }
        target.lock().unwrap().push((
            conversation_id.to_string(),
            admin_id.to_string(),
            text.to_string(),
        ));
        Ok(())
    }
}

impl MessagingClient for MockMessaging {
    async fn add_note(
        &self,
        conversation_id: &str,
        admin_id: &str,
        text: &str,
    ) -> Result<(), MessagingError> {
        self.post(&self.notes, conversation_id, admin_id, text)
    }

    async fn add_message(
        &self,
        conversation_id: &str,
        admin_id: &str,
        text: &str,
    ) -> Result<(), MessagingError> {
        self.post(&self.messages, conversation_id, admin_id, text)
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Sink that keeps every record in memory.
#[derive(Default)]
pub struct RecordingSink {
    results: Mutex<Vec<ProcessingResult>>,
    exceptions: Mutex<Vec<DomainException>>,
    fail: bool,
}

impl RecordingSink {
    /// Sink whose every write fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn results(&self) -> Vec<ProcessingResult> {
        self.results.lock().unwrap().clone()
    }

    pub fn exceptions(&self) -> Vec<DomainException> {
        self.exceptions.lock().unwrap().clone()
    }
}

impl ResultSink for RecordingSink {
    async fn record_result(&self, result: &ProcessingResult) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError("disk full".into()));
        }
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }

    async fn record_exception(&self, exception: &DomainException) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError("disk full".into()));
        }
        self.exceptions.lock().unwrap().push(exception.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Cache whose backend is unreachable.
#[derive(Default)]
pub struct FailingCache;

impl Cache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn set_nx(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<bool, CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
}

/// Cache whose calls never complete.
#[derive(Default)]
pub struct HangingCache;

impl Cache for HangingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), CacheError> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        std::future::pending().await
    }

    async fn set_nx(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<bool, CacheError> {
        std::future::pending().await
    }
}
