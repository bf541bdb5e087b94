//! Topic dispatch with timing and failure routing.
//!
//! - success: `ProcessingResult` to the sink (except closure), acknowledged
//! - domain failure: `DomainException` to the sink, acknowledged
//! - unclassified failure: recorded with a backtrace, then returned as `RouteError`
//!
//! Sink writes are best-effort. A failed write is logged and never changes
//! the routing outcome.

use std::backtrace::Backtrace;
use std::time::Instant;

use polyglot_types::error::HandlerError;
use polyglot_types::event::ConversationEvent;
use polyglot_types::result::{DomainException, ProcessingResult};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::analysis::ContextAnalyzer;
use crate::cache::Cache;
use crate::handler::{Handler, HandlerContext, HandlerOutcome};
use crate::language::TranslationService;
use crate::messaging::MessagingClient;
use crate::sink::ResultSink;

/// Exception class recorded for failures no handler classified.
pub const UNCLASSIFIED: &str = "Unclassified";

/// How a routed event ended, when it is acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Processed(HandlerOutcome),
    /// A classified failure was recorded.
    Failed,
    /// The topic has no handler.
    Unhandled,
}

/// An unclassified failure. The transport must report it as a server error.
#[derive(Debug, Error)]
#[error("unclassified failure handling {event_type}: {message}")]
pub struct RouteError {
    pub event_type: String,
    pub message: String,
}

/// Dispatches validated events to their handler.
pub struct EventRouter<C, T, A, M, S>
where
    C: Cache,
    T: TranslationService,
    A: ContextAnalyzer,
    M: MessagingClient,
    S: ResultSink,
{
    handlers: HandlerContext<C, T, A, M>,
    sink: S,
}

impl<C, T, A, M, S> EventRouter<C, T, A, M, S>
where
    C: Cache,
    T: TranslationService,
    A: ContextAnalyzer,
    M: MessagingClient,
    S: ResultSink,
{
    pub fn new(handlers: HandlerContext<C, T, A, M>, sink: S) -> Self {
        Self { handlers, sink }
    }

    pub fn handlers(&self) -> &HandlerContext<C, T, A, M> {
        &self.handlers
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[tracing::instrument(
        name = "route",
        skip_all,
        fields(event_id = %event.event_id, topic = %event.topic, conversation_id = %event.conversation_id)
    )]
    pub async fn route(&self, event: &ConversationEvent) -> Result<RouteOutcome, RouteError> {
        let Some(handler) = Handler::for_topic(&event.topic) else {
            info!("unhandled topic");
            return Ok(RouteOutcome::Unhandled);
        };

        let started = Instant::now();
        let result = handler.handle(&self.handlers, event).await;
        let execution_time = started.elapsed().as_secs_f64();

        match result {
            Ok(outcome) => {
                info!(?outcome, execution_time, "event processed");
                if handler.emits_result() {
                    let record = ProcessingResult::success(handler.event_type(), execution_time);
                    if let Err(e) = self.sink.record_result(&record).await {
                        warn!(error = %e, "failed to record processing result");
                    }
                }
                Ok(RouteOutcome::Processed(outcome))
            }
            Err(HandlerError::Domain(exception)) => {
                error!(
                    exception_class = %exception.exception_class,
                    params = ?exception.params,
                    execution_time,
                    "{}", exception.message
                );
                self.record_exception(&exception).await;
                Ok(RouteOutcome::Failed)
            }
            Err(HandlerError::Unclassified {
                event_type,
                message,
            }) => {
                error!(execution_time, "unclassified failure: {message}");
                let exception = DomainException::new(UNCLASSIFIED, message.as_str(), event_type.as_str())
                    .with_param("conversation_id", event.conversation_id.as_str())
                    .with_param("event_id", event.event_id.as_str())
                    .with_stack_trace(Backtrace::force_capture().to_string());
                self.record_exception(&exception).await;
                Err(RouteError {
                    event_type,
                    message,
                })
            }
        }
    }

    /// Record `exception`, logging instead of failing when the sink is down.
    pub async fn record_exception(&self, exception: &DomainException) {
        if let Err(e) = self.sink.record_exception(exception).await {
            warn!(error = %e, exception_class = %exception.exception_class, "failed to record exception");
        }
    }
}
