//! Per-conversation state tracked by the relay.
//!
//! A `ConversationState` is created when a user opens a conversation, mutated
//! by user replies and admin notes, and removed when an admin closes the
//! conversation (or when its TTL lapses in the cache).

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Default lifetime of a stored conversation state, in seconds.
pub const DEFAULT_CONVERSATION_TTL_SECS: u64 = 1600;

/// Whether the relay is actively translating a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConversationStatus {
    Stopped,
    Started,
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationStatus::Stopped => write!(f, "STOPPED"),
            ConversationStatus::Started => write!(f, "STARTED"),
        }
    }
}

impl FromStr for ConversationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STOPPED" => Ok(ConversationStatus::Stopped),
            "STARTED" => Ok(ConversationStatus::Started),
            other => Err(format!("invalid conversation status: '{other}'")),
        }
    }
}

/// Languages the relay can translate into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Hindi,
    Hinglish,
    Bengali,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Hindi => write!(f, "Hindi"),
            Language::Hinglish => write!(f, "Hinglish"),
            Language::Bengali => write!(f, "Bengali"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "english" => Ok(Language::English),
            "hindi" => Ok(Language::Hindi),
            "hinglish" => Ok(Language::Hinglish),
            "bengali" => Ok(Language::Bengali),
            other => Err(format!("invalid language: '{other}'")),
        }
    }
}

/// Result of language detection on a message.
///
/// Detection may fail to commit to a language, in which case it reports
/// `Uncertain` rather than guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectedLanguage {
    English,
    Hindi,
    Hinglish,
    Bengali,
    Uncertain,
}

impl DetectedLanguage {
    /// The concrete language, if detection committed to one.
    pub fn known(self) -> Option<Language> {
        match self {
            DetectedLanguage::English => Some(Language::English),
            DetectedLanguage::Hindi => Some(Language::Hindi),
            DetectedLanguage::Hinglish => Some(Language::Hinglish),
            DetectedLanguage::Bengali => Some(Language::Bengali),
            DetectedLanguage::Uncertain => None,
        }
    }

    pub fn is_english(self) -> bool {
        self == DetectedLanguage::English
    }
}

impl From<Language> for DetectedLanguage {
    fn from(language: Language) -> Self {
        match language {
            Language::English => DetectedLanguage::English,
            Language::Hindi => DetectedLanguage::Hindi,
            Language::Hinglish => DetectedLanguage::Hinglish,
            Language::Bengali => DetectedLanguage::Bengali,
        }
    }
}

impl fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.known() {
            Some(language) => language.fmt(f),
            None => write!(f, "Uncertain"),
        }
    }
}

impl FromStr for DetectedLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("uncertain") {
            return Ok(DetectedLanguage::Uncertain);
        }
        s.parse::<Language>()
            .map(DetectedLanguage::from)
            .map_err(|_| format!("invalid detected language: '{s}'"))
    }
}

/// State of a single support conversation.
///
/// Invariants:
/// - `language` is `None` whenever `status` is `Stopped`.
/// - `last_message` is the most recent user message seen, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub conversation_id: String,
    pub status: ConversationStatus,
    #[serde(default)]
    pub language: Option<Language>,
    pub last_message: String,
    /// Rolling free-text summary of open issues, used to interpret later messages.
    #[serde(default)]
    pub context_analysis: String,
}

impl ConversationState {
    /// Fresh state for a newly opened conversation: stopped, no language.
    pub fn new(conversation_id: impl Into<String>, last_message: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            status: ConversationStatus::Stopped,
            language: None,
            last_message: last_message.into(),
            context_analysis: String::new(),
        }
    }

    pub fn is_started(&self) -> bool {
        self.status == ConversationStatus::Started
    }

    /// Begin translating. Keeps the current language if one is set.
    pub fn start(&mut self) {
        self.status = ConversationStatus::Started;
    }

    /// Begin translating in the given language.
    pub fn start_with(&mut self, language: Language) {
        self.status = ConversationStatus::Started;
        self.language = Some(language);
    }

    /// Stop translating. Clears the language.
    pub fn stop(&mut self) {
        self.status = ConversationStatus::Stopped;
        self.language = None;
    }
}
