//! Event intake pipeline.
//!
//! Malformed payloads and duplicates are acknowledged without side effects.
//! The event id is reserved before routing starts, so a redelivery that
//! arrives mid-processing is already a duplicate.

use polyglot_types::event::ConversationEvent;
use polyglot_types::result::DomainException;
use tracing::{info, warn};

use crate::analysis::ContextAnalyzer;
use crate::cache::Cache;
use crate::event::parse_envelope;
use crate::language::TranslationService;
use crate::messaging::MessagingClient;
use crate::router::{EventRouter, RouteError, RouteOutcome};
use crate::sink::ResultSink;

use super::guard::IdempotencyGuard;

/// How an inbound payload was acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// The payload failed validation.
    Malformed,
    /// The event id was already reserved.
    Duplicate,
    /// The idempotency cache failed; the event was not routed.
    ReservationFailed,
    Routed(RouteOutcome),
}

impl IntakeOutcome {
    /// Short status for transport responses.
    pub fn status(self) -> &'static str {
        match self {
            IntakeOutcome::Malformed => "malformed",
            IntakeOutcome::Duplicate => "duplicate",
            IntakeOutcome::ReservationFailed => "failed",
            IntakeOutcome::Routed(RouteOutcome::Processed(_)) => "processed",
            IntakeOutcome::Routed(RouteOutcome::Failed) => "failed",
            IntakeOutcome::Routed(RouteOutcome::Unhandled) => "ignored",
        }
    }
}

/// Parses, deduplicates, and routes raw webhook payloads.
pub struct EventIntake<C, T, A, M, S>
where
    C: Cache,
    T: TranslationService,
    A: ContextAnalyzer,
    M: MessagingClient,
    S: ResultSink,
{
    guard: IdempotencyGuard<C>,
    router: EventRouter<C, T, A, M, S>,
}

impl<C, T, A, M, S> EventIntake<C, T, A, M, S>
where
    C: Cache,
    T: TranslationService,
    A: ContextAnalyzer,
    M: MessagingClient,
    S: ResultSink,
{
    pub fn new(guard: IdempotencyGuard<C>, router: EventRouter<C, T, A, M, S>) -> Self {
        Self { guard, router }
    }

    pub fn router(&self) -> &EventRouter<C, T, A, M, S> {
        &self.router
    }

    /// Accept one raw payload.
    ///
    /// `Err` only for unclassified failures; every other outcome is an
    /// acknowledgement.
    #[tracing::instrument(name = "accept", skip_all, fields(bytes = payload.len()))]
    pub async fn accept(&self, payload: &[u8]) -> Result<IntakeOutcome, RouteError> {
        let event = match parse_envelope(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "malformed webhook payload ignored");
                return Ok(IntakeOutcome::Malformed);
            }
        };
        self.accept_event(&event).await
    }

    /// Reserve and route an already validated event.
    pub async fn accept_event(&self, event: &ConversationEvent) -> Result<IntakeOutcome, RouteError> {
        match self.guard.reserve(&event.event_id).await {
            Ok(true) => {}
            Ok(false) => {
                info!(event_id = %event.event_id, topic = %event.topic, "duplicate event ignored");
                return Ok(IntakeOutcome::Duplicate);
            }
            Err(e) => {
                warn!(event_id = %event.event_id, error = %e, "idempotency reservation failed");
                let exception = DomainException::new(
                    e.exception_class(),
                    format!("idempotency reservation failed: {e}"),
                    event.topic.as_str(),
                )
                .with_param("event_id", event.event_id.as_str())
                .with_param("conversation_id", event.conversation_id.as_str());
                self.router.record_exception(&exception).await;
                return Ok(IntakeOutcome::ReservationFailed);
            }
        }

        self.router.route(event).await.map(IntakeOutcome::Routed)
    }
}
