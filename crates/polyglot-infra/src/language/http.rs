//! HTTP client for the external language service.
//!
//! One service answers translation, detection, and the two analysis calls:
//!
//! | Call | Endpoint | Request | Response |
//! |---|---|---|---|
//! | translate | `POST /v1/translate` | `{text, target}` | `{text}` |
//! | detect | `POST /v1/detect` | `{text}` | `{language}` |
//! | user analysis | `POST /v1/analyze/user` | `{message, context, language}` | `UserMessageAnalysis` |
//! | agent analysis | `POST /v1/analyze/agent` | `{message, context, language}` | `{context_analysis}` |
//!
//! Languages travel as lowercase names (`"hinglish"`); detection may also
//! answer `"uncertain"`.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use polyglot_core::analysis::{ContextAnalyzer, UserMessageAnalysis};
use polyglot_core::language::TranslationService;
use polyglot_types::conversation::{DetectedLanguage, Language};
use polyglot_types::error::LanguageError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    target: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    text: String,
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    language: String,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    message: &'a str,
    context: &'a str,
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct AgentAnalysisResponse {
    context_analysis: String,
}

fn wire_name(language: Language) -> &'static str {
    match language {
        Language::English => "english",
        Language::Hindi => "hindi",
        Language::Hinglish => "hinglish",
        Language::Bengali => "bengali",
    }
}

/// Language-service client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpLanguageService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLanguageService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, LanguageError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LanguageError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, LanguageError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| LanguageError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LanguageError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(path, "language service answered");
        response
            .json()
            .await
            .map_err(|e| LanguageError::Deserialization(format!("failed to parse {path} response: {e}")))
    }

    async fn translate(&self, text: &str, target: Language) -> Result<String, LanguageError> {
        let response: TranslateResponse = self
            .post(
                "/v1/translate",
                &TranslateRequest {
                    text,
                    target: wire_name(target),
                },
            )
            .await?;
        Ok(response.text)
    }
}

impl TranslationService for HttpLanguageService {
    async fn english_to_hindi(&self, text: &str) -> Result<String, LanguageError> {
        self.translate(text, Language::Hindi).await
    }

    async fn english_to_hinglish(&self, text: &str) -> Result<String, LanguageError> {
        self.translate(text, Language::Hinglish).await
    }

    async fn english_to_bengali(&self, text: &str) -> Result<String, LanguageError> {
        self.translate(text, Language::Bengali).await
    }

    async fn to_english(&self, text: &str) -> Result<String, LanguageError> {
        self.translate(text, Language::English).await
    }

    async fn detect(&self, text: &str) -> Result<DetectedLanguage, LanguageError> {
        let response: DetectResponse = self.post("/v1/detect", &DetectRequest { text }).await?;
        response
            .language
            .parse()
            .map_err(LanguageError::ContractViolation)
    }
}

impl ContextAnalyzer for HttpLanguageService {
    async fn analyze_user_message(
        &self,
        message: &str,
        context: &str,
        language: Language,
    ) -> Result<UserMessageAnalysis, LanguageError> {
        self.post(
            "/v1/analyze/user",
            &AnalyzeRequest {
                message,
                context,
                language: wire_name(language),
            },
        )
        .await
    }

    async fn analyze_agent_message(
        &self,
        message: &str,
        context: &str,
        language: Language,
    ) -> Result<String, LanguageError> {
        let response: AgentAnalysisResponse = self
            .post(
                "/v1/analyze/agent",
                &AnalyzeRequest {
                    message,
                    context,
                    language: wire_name(language),
                },
            )
            .await?;
        Ok(response.context_analysis)
    }
}

impl std::fmt::Debug for HttpLanguageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLanguageService")
            .field("base_url", &self.base_url)
            .finish()
    }
}
