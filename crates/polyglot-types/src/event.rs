//! Inbound webhook event types.
//!
//! The raw envelope types mirror the messaging platform's JSON with every
//! nested field optional. They are validated exactly once, at the boundary,
//! into a [`ConversationEvent`]; handlers never look at raw JSON.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Topic of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventTopic {
    UserCreated,
    UserReplied,
    AdminNoted,
    AdminClosed,
    /// Any topic the relay does not handle.
    Other(String),
}

impl EventTopic {
    pub const USER_CREATED: &'static str = "conversation.user.created";
    pub const USER_REPLIED: &'static str = "conversation.user.replied";
    pub const ADMIN_NOTED: &'static str = "conversation.admin.noted";
    pub const ADMIN_CLOSED: &'static str = "conversation.admin.closed";

    pub fn parse(topic: &str) -> Self {
        match topic {
            Self::USER_CREATED => EventTopic::UserCreated,
            Self::USER_REPLIED => EventTopic::UserReplied,
            Self::ADMIN_NOTED => EventTopic::AdminNoted,
            Self::ADMIN_CLOSED => EventTopic::AdminClosed,
            other => EventTopic::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventTopic::UserCreated => Self::USER_CREATED,
            EventTopic::UserReplied => Self::USER_REPLIED,
            EventTopic::AdminNoted => Self::ADMIN_NOTED,
            EventTopic::AdminClosed => Self::ADMIN_CLOSED,
            EventTopic::Other(topic) => topic,
        }
    }

    pub fn is_handled(&self) -> bool {
        !matches!(self, EventTopic::Other(_))
    }
}

impl fmt::Display for EventTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of a conversation part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Author {
    /// Author type as reported by the platform ("user", "admin", "bot", ...).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A validated event, ready for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEvent {
    /// Idempotency key.
    pub event_id: String,
    pub topic: EventTopic,
    pub conversation_id: String,
    /// Message text reduced to plain text. Empty for topics without a body.
    pub body: String,
    pub author: Option<Author>,
}

/// Reasons an inbound payload is rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("payload is missing required field `{0}`")]
    MissingField(&'static str),
}

// ---------------------------------------------------------------------------
// Raw envelope (serde mirror of the webhook JSON)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub data: Option<EnvelopeData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvelopeData {
    #[serde(default)]
    pub item: Option<ConversationItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationItem {
    /// Conversation id. The platform sends strings, but numbers are tolerated.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub conversation_parts: Option<ConversationParts>,
    #[serde(default)]
    pub source: Option<ConversationSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationParts {
    #[serde(default)]
    pub conversation_parts: Vec<ConversationPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationPart {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub part_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationSource {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
}

impl ConversationItem {
    /// Conversation id as a string, whether sent as a JSON string or number.
    pub fn conversation_id(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// The most recent conversation part, if any.
    pub fn last_part(&self) -> Option<&ConversationPart> {
        self.conversation_parts
            .as_ref()
            .and_then(|parts| parts.conversation_parts.last())
    }
}
