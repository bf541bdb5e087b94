//! Conversation state machine.
//!
//! One [`Handler`] per handled topic. Each handler receives its collaborators
//! through an explicit [`HandlerContext`] and holds the conversation lock for
//! its whole read-modify-write. State is written back only after every
//! outbound call for the event has succeeded.

pub mod admin_closed;
pub mod admin_noted;
pub mod command;
pub mod user_created;
pub mod user_replied;

use std::time::Duration;

use polyglot_types::conversation::{DetectedLanguage, Language};
use polyglot_types::error::{HandlerError, LanguageError, MessagingError};
use polyglot_types::event::{ConversationEvent, EventTopic};
use polyglot_types::result::DomainException;

use crate::analysis::{ContextAccumulator, ContextAnalyzer};
use crate::cache::Cache;
use crate::deadline::with_deadline;
use crate::language::{TranslationOrchestrator, TranslationService};
use crate::messaging::MessagingClient;
use crate::state::{ConversationLocks, ConversationStateStore};

pub use command::AdminCommand;

/// Language assumed when detection cannot decide and nothing is stored.
pub const FALLBACK_LANGUAGE: Language = Language::Hinglish;

/// What a successful handler invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// A fresh conversation state was stored.
    StateCreated,
    /// The stored state changed, nothing was sent.
    StateUpdated,
    /// An internal note was posted for the admin.
    NoteSent,
    /// An admin message was translated and sent to the user.
    MessageRelayed,
    /// The event needs no action (plain note, relay while stopped).
    Ignored,
    /// No state exists for the conversation; nothing was done.
    StateMissing,
    /// The conversation state was removed.
    StateDeleted,
}

/// Collaborators and settings shared by every handler.
pub struct HandlerContext<C, T, A, M>
where
    C: Cache,
    T: TranslationService,
    A: ContextAnalyzer,
    M: MessagingClient,
{
    pub store: ConversationStateStore<C>,
    pub locks: ConversationLocks,
    pub translator: TranslationOrchestrator<T>,
    pub accumulator: ContextAccumulator<A>,
    pub messaging: M,
    /// Author of every note the relay posts.
    pub bot_admin_id: String,
    pub messaging_timeout: Duration,
}

impl<C, T, A, M> HandlerContext<C, T, A, M>
where
    C: Cache,
    T: TranslationService,
    A: ContextAnalyzer,
    M: MessagingClient,
{
    /// Post an internal note authored by the bot admin.
    pub(crate) async fn send_note(
        &self,
        event: &ConversationEvent,
        text: &str,
    ) -> Result<(), HandlerError> {
        with_deadline(
            self.messaging_timeout,
            self.messaging
                .add_note(&event.conversation_id, &self.bot_admin_id, text),
            MessagingError::Timeout,
        )
        .await
        .map_err(|e| messaging_failure(&e, event, "add_note"))
    }

    /// Send a user-visible reply authored by `admin_id`.
    pub(crate) async fn send_message(
        &self,
        event: &ConversationEvent,
        admin_id: &str,
        text: &str,
    ) -> Result<(), HandlerError> {
        with_deadline(
            self.messaging_timeout,
            self.messaging
                .add_message(&event.conversation_id, admin_id, text),
            MessagingError::Timeout,
        )
        .await
        .map_err(|e| messaging_failure(&e, event, "add_message"))
    }

    /// Author for a relayed message: the noting admin, else the bot admin.
    pub(crate) fn relay_author<'a>(&'a self, event: &'a ConversationEvent) -> &'a str {
        event
            .author
            .as_ref()
            .and_then(|a| a.id.as_deref())
            .filter(|id| !id.is_empty())
            .unwrap_or(self.bot_admin_id.as_str())
    }
}

/// The four handled topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    UserCreated,
    UserReplied,
    AdminNoted,
    AdminClosed,
}

impl Handler {
    /// Handler for `topic`, or `None` for topics the relay ignores.
    pub fn for_topic(topic: &EventTopic) -> Option<Self> {
        match topic {
            EventTopic::UserCreated => Some(Handler::UserCreated),
            EventTopic::UserReplied => Some(Handler::UserReplied),
            EventTopic::AdminNoted => Some(Handler::AdminNoted),
            EventTopic::AdminClosed => Some(Handler::AdminClosed),
            EventTopic::Other(_) => None,
        }
    }

    pub fn event_type(self) -> &'static str {
        match self {
            Handler::UserCreated => EventTopic::USER_CREATED,
            Handler::UserReplied => EventTopic::USER_REPLIED,
            Handler::AdminNoted => EventTopic::ADMIN_NOTED,
            Handler::AdminClosed => EventTopic::ADMIN_CLOSED,
        }
    }

    /// Whether a successful run is reported to the result sink.
    pub fn emits_result(self) -> bool {
        !matches!(self, Handler::AdminClosed)
    }

    pub async fn handle<C, T, A, M>(
        self,
        ctx: &HandlerContext<C, T, A, M>,
        event: &ConversationEvent,
    ) -> Result<HandlerOutcome, HandlerError>
    where
        C: Cache,
        T: TranslationService,
        A: ContextAnalyzer,
        M: MessagingClient,
    {
        match self {
            Handler::UserCreated => user_created::handle(ctx, event).await,
            Handler::UserReplied => user_replied::handle(ctx, event).await,
            Handler::AdminNoted => admin_noted::handle(ctx, event).await,
            Handler::AdminClosed => admin_closed::handle(ctx, event).await,
        }
    }
}

/// Language to use after detection: the detected one, else the stored one,
/// else [`FALLBACK_LANGUAGE`].
pub(crate) fn resolve_language(detected: DetectedLanguage, stored: Option<Language>) -> Language {
    detected.known().or(stored).unwrap_or(FALLBACK_LANGUAGE)
}

/// Classify a language-service failure.
///
/// Transient failures become a `DomainException` (recorded, acknowledged).
/// Broken contracts and undecodable answers are unclassified.
pub(crate) fn language_failure(
    error: LanguageError,
    event: &ConversationEvent,
    operation: &str,
) -> HandlerError {
    if error.is_transient() {
        DomainException::new(error.exception_class(), error.to_string(), event.topic.as_str())
            .with_param("conversation_id", event.conversation_id.as_str())
            .with_param("operation", operation)
            .with_excerpt("message", &event.body)
            .into()
    } else {
        HandlerError::Unclassified {
            event_type: event.topic.to_string(),
            message: format!("{operation}: {error}"),
        }
    }
}

fn messaging_failure(
    error: &MessagingError,
    event: &ConversationEvent,
    operation: &str,
) -> HandlerError {
    DomainException::new(error.exception_class(), error.to_string(), event.topic.as_str())
        .with_param("conversation_id", event.conversation_id.as_str())
        .with_param("operation", operation)
        .into()
}
