//! Admin note commands.

use polyglot_types::conversation::Language;

/// A command written by an admin as an internal note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// `!start`: begin translating with the current language.
    Start,
    /// `!stop`: stop translating and forget the language.
    Stop,
    /// `!detect start`: detect the language of the last user message, then start.
    DetectStart,
    /// `!force hi`, `!force hindi`, `!force bn`: start in a fixed language.
    Force(Language),
    /// `!<text>`: translate `<text>` and send it to the user.
    Relay(String),
}

impl AdminCommand {
    /// Parse a note body. `None` for notes that are not commands.
    ///
    /// Matching is literal and case-sensitive on the trimmed text.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let command = match text {
            "!start" => AdminCommand::Start,
            "!stop" => AdminCommand::Stop,
            "!detect start" => AdminCommand::DetectStart,
            "!force hi" => AdminCommand::Force(Language::Hinglish),
            "!force hindi" => AdminCommand::Force(Language::Hindi),
            "!force bn" => AdminCommand::Force(Language::Bengali),
            other => {
                let relay = other.strip_prefix('!')?.trim();
                if relay.is_empty() {
                    return None;
                }
                AdminCommand::Relay(relay.to_string())
            }
        };
        Some(command)
    }
}
