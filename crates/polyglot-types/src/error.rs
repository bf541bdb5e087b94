use std::time::Duration;

use thiserror::Error;

use crate::result::DomainException;

/// Errors from the shared key-value cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache serialization error: {0}")]
    Serialization(String),

    #[error("cache call timed out after {0:?}")]
    Timeout(Duration),
}

impl CacheError {
    /// Class name recorded on the resulting `DomainException`.
    pub fn exception_class(&self) -> &'static str {
        match self {
            CacheError::Unavailable(_) => "CacheUnavailable",
            CacheError::Serialization(_) => "CacheSerialization",
            CacheError::Timeout(_) => "CacheTimeout",
        }
    }
}

/// Errors from the outbound messaging platform.
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("messaging request failed: {0}")]
    Request(String),

    #[error("messaging API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("messaging call timed out after {0:?}")]
    Timeout(Duration),
}

impl MessagingError {
    pub fn exception_class(&self) -> &'static str {
        match self {
            MessagingError::Request(_) => "MessagingClientError",
            MessagingError::Status { .. } => "MessagingApiError",
            MessagingError::Timeout(_) => "MessagingTimeout",
        }
    }
}

/// Errors from the translation, detection, and analysis service.
#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("language service request failed: {0}")]
    Request(String),

    #[error("language service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("language service response could not be decoded: {0}")]
    Deserialization(String),

    #[error("language service call timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered, but the answer breaks its contract
    /// (e.g. an uncertain analysis with fewer than two interpretations).
    #[error("language service contract violation: {0}")]
    ContractViolation(String),
}

impl LanguageError {
    /// Transient failures are acknowledged and recorded; the rest are fatal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LanguageError::Request(_) | LanguageError::Status { .. } | LanguageError::Timeout(_)
        )
    }

    pub fn exception_class(&self) -> &'static str {
        match self {
            LanguageError::Request(_) => "LanguageClientError",
            LanguageError::Status { .. } => "LanguageApiError",
            LanguageError::Deserialization(_) => "LanguageDeserialization",
            LanguageError::Timeout(_) => "LanguageTimeout",
            LanguageError::ContractViolation(_) => "LanguageContractViolation",
        }
    }
}

/// Failure of a single handler invocation.
///
/// `Domain` failures are classified: the router records them and acknowledges
/// the event. `Unclassified` failures are recorded and re-raised.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Domain(DomainException),

    #[error("unclassified failure in {event_type}: {message}")]
    Unclassified { event_type: String, message: String },
}

impl From<DomainException> for HandlerError {
    fn from(e: DomainException) -> Self {
        HandlerError::Domain(e)
    }
}
