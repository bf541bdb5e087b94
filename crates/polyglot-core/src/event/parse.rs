//! Webhook envelope validation.
//!
//! Required fields per topic:
//! - every event: `id`, `topic`
//! - every handled topic: `data.item.id`
//! - `conversation.user.created`: `data.item.source.body`
//! - `conversation.user.replied`, `conversation.admin.noted`: the body of the
//!   last entry in `data.item.conversation_parts.conversation_parts`
//!
//! Unhandled topics only need `id` and `topic`; the router ignores them.

use html2text::render::TrivialDecorator;
use polyglot_types::event::{
    ConversationEvent, ConversationItem, EnvelopeError, EventTopic, WebhookEnvelope,
};

/// Wrap width for HTML rendering; wide enough that messages never wrap.
const RENDER_WIDTH: usize = 10_000;

/// Parse and validate raw webhook bytes.
pub fn parse_envelope(bytes: &[u8]) -> Result<ConversationEvent, EnvelopeError> {
    let envelope: WebhookEnvelope =
        serde_json::from_slice(bytes).map_err(|e| EnvelopeError::InvalidJson(e.to_string()))?;
    validate(envelope)
}

fn validate(envelope: WebhookEnvelope) -> Result<ConversationEvent, EnvelopeError> {
    let event_id = envelope
        .id
        .filter(|id| !id.is_empty())
        .ok_or(EnvelopeError::MissingField("id"))?;
    let topic = envelope
        .topic
        .filter(|t| !t.is_empty())
        .map(|t| EventTopic::parse(&t))
        .ok_or(EnvelopeError::MissingField("topic"))?;

    let item = envelope.data.and_then(|d| d.item);

    if !topic.is_handled() {
        let conversation_id = item
            .as_ref()
            .and_then(ConversationItem::conversation_id)
            .unwrap_or_default();
        return Ok(ConversationEvent {
            event_id,
            topic,
            conversation_id,
            body: String::new(),
            author: None,
        });
    }

    let item = item.ok_or(EnvelopeError::MissingField("data.item"))?;
    let conversation_id = item
        .conversation_id()
        .ok_or(EnvelopeError::MissingField("data.item.id"))?;

    let (body, author) = match topic {
        EventTopic::UserCreated => {
            let source = item
                .source
                .as_ref()
                .ok_or(EnvelopeError::MissingField("data.item.source"))?;
            let body = source
                .body
                .as_deref()
                .ok_or(EnvelopeError::MissingField("data.item.source.body"))?;
            (html_to_text(body), source.author.clone())
        }
        EventTopic::UserReplied | EventTopic::AdminNoted => {
            let part = item
                .last_part()
                .ok_or(EnvelopeError::MissingField("data.item.conversation_parts"))?;
            let body = part
                .body
                .as_deref()
                .ok_or(EnvelopeError::MissingField("conversation_parts.body"))?;
            (html_to_text(body), part.author.clone())
        }
        _ => (String::new(), item.last_part().and_then(|p| p.author.clone())),
    };

    Ok(ConversationEvent {
        event_id,
        topic,
        conversation_id,
        body,
        author,
    })
}

/// Reduce an HTML message body to trimmed plain text.
///
/// Emphasis markers and link footnotes are dropped; only the literal text
/// survives. Falls back to the raw input when the renderer rejects it.
pub fn html_to_text(html: &str) -> String {
    match html2text::from_read_with_decorator(html.as_bytes(), RENDER_WIDTH, TrivialDecorator::new()) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to render HTML body, using raw text");
            html.trim().to_string()
        }
    }
}
