//! Configuration types for Polyglot.
//!
//! `AppConfig` represents the top-level `polyglot.toml`. Every section and field
//! has a default, so an empty file (or no file) yields a runnable configuration.
//! Secrets are never part of this file; they come from the environment.

use serde::{Deserialize, Serialize};

use crate::conversation::DEFAULT_CONVERSATION_TTL_SECS;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub idempotency: IdempotencyConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub intercom: IntercomConfig,
    #[serde(default)]
    pub language_service: LanguageServiceConfig,
    #[serde(default)]
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Lifetime of an untouched conversation state.
    #[serde(default = "default_conversation_ttl")]
    pub ttl_secs: u64,
    /// Admin id used as the author of relay-generated notes.
    #[serde(default)]
    pub bot_admin_id: String,
}

fn default_conversation_ttl() -> u64 {
    DEFAULT_CONVERSATION_TTL_SECS
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_conversation_ttl(),
            bot_admin_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyConfig {
    /// Lifetime of an event-id marker. `0` keeps markers forever.
    #[serde(default = "default_idempotency_ttl")]
    pub ttl_secs: u64,
}

fn default_idempotency_ttl() -> u64 {
    86_400
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_idempotency_ttl(),
        }
    }
}

/// Which cache implementation backs idempotency markers and conversation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local map. Only correct for a single replica.
    #[default]
    Memory,
    /// SQLite file shared by every worker on the host.
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    #[serde(default = "default_cache_url")]
    pub database_url: String,
}

fn default_cache_url() -> String {
    "sqlite://polyglot-cache.db?mode=rwc".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            database_url: default_cache_url(),
        }
    }
}

/// Upper bounds on every outbound call, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_cache_ms")]
    pub cache_ms: u64,
    #[serde(default = "default_language_ms")]
    pub language_ms: u64,
    #[serde(default = "default_messaging_ms")]
    pub messaging_ms: u64,
}

fn default_cache_ms() -> u64 {
    2_000
}

fn default_language_ms() -> u64 {
    30_000
}

fn default_messaging_ms() -> u64 {
    10_000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            cache_ms: default_cache_ms(),
            language_ms: default_language_ms(),
            messaging_ms: default_messaging_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntercomConfig {
    #[serde(default = "default_intercom_url")]
    pub base_url: String,
}

fn default_intercom_url() -> String {
    "https://api.intercom.io".to_string()
}

impl Default for IntercomConfig {
    fn default() -> Self {
        Self {
            base_url: default_intercom_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageServiceConfig {
    #[serde(default = "default_language_url")]
    pub base_url: String,
}

fn default_language_url() -> String {
    "http://127.0.0.1:9000".to_string()
}

impl Default for LanguageServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_language_url(),
        }
    }
}

/// Where processing results and exceptions are persisted.
///
/// Without a `database_url` records are only logged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.conversation.ttl_secs, 1600);
        assert_eq!(config.idempotency.ttl_secs, 86_400);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert!(config.sink.database_url.is_none());
    }

    #[test]
    fn test_app_config_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_app_config_deserialize_with_values() {
        let toml_str = r#"
[server]
port = 9090

[conversation]
ttl_secs = 600
bot_admin_id = "4242"

[cache]
backend = "sqlite"
database_url = "sqlite:///tmp/cache.db"

[timeouts]
language_ms = 5000

[sink]
database_url = "sqlite:///tmp/sink.db"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.conversation.ttl_secs, 600);
        assert_eq!(config.conversation.bot_admin_id, "4242");
        assert_eq!(config.cache.backend, CacheBackend::Sqlite);
        assert_eq!(config.timeouts.language_ms, 5000);
        assert_eq!(config.timeouts.cache_ms, 2000);
        assert_eq!(config.sink.database_url.as_deref(), Some("sqlite:///tmp/sink.db"));
    }

    #[test]
    fn test_app_config_toml_roundtrip() {
        let mut config = AppConfig::default();
        config.conversation.bot_admin_id = "1".into();
        let text = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
