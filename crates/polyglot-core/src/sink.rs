//! Result and exception sink.
//!
//! An append-only destination for `ProcessingResult` and `DomainException`
//! records. Writes are best-effort: callers log a failed write and carry on.

use polyglot_types::result::{DomainException, ProcessingResult};
use thiserror::Error;
use tracing::{error, info};

/// Failure to persist a record.
#[derive(Debug, Error)]
#[error("sink write failed: {0}")]
pub struct SinkError(pub String);

/// Trait for recording routing outcomes.
pub trait ResultSink: Send + Sync {
    fn record_result(
        &self,
        result: &ProcessingResult,
    ) -> impl std::future::Future<Output = Result<(), SinkError>> + Send;

    fn record_exception(
        &self,
        exception: &DomainException,
    ) -> impl std::future::Future<Output = Result<(), SinkError>> + Send;
}

/// Sink that only emits structured log events.
///
/// Used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ResultSink for TracingSink {
    async fn record_result(&self, result: &ProcessingResult) -> Result<(), SinkError> {
        info!(
            event_type = %result.event_type,
            is_success = result.is_success,
            execution_time = ?result.execution_time,
            "processing result"
        );
        Ok(())
    }

    async fn record_exception(&self, exception: &DomainException) -> Result<(), SinkError> {
        error!(
            exception_class = %exception.exception_class,
            event_type = %exception.event_type,
            params = ?exception.params,
            message = %exception.message,
            "domain exception"
        );
        Ok(())
    }
}
