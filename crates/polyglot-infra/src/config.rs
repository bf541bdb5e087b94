//! Configuration loader for Polyglot.
//!
//! Reads `polyglot.toml` into [`AppConfig`], falling back to defaults when the
//! file is missing or malformed, then applies `POLYGLOT_*` environment
//! overrides. Secrets are read from the environment only.

use std::path::Path;

use polyglot_types::config::{AppConfig, CacheBackend};
use secrecy::SecretString;

/// Environment variable holding the Intercom access token.
pub const INTERCOM_TOKEN_ENV: &str = "POLYGLOT_INTERCOM_TOKEN";

/// Load configuration from `path`, then apply environment overrides.
pub async fn load_config(path: &Path) -> AppConfig {
    let config = load_config_file(path).await;
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Load configuration from `path` without environment overrides.
///
/// - missing file: [`AppConfig::default()`]
/// - unreadable or unparsable file: logs a warning, returns the default
pub async fn load_config_file(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

/// Apply `POLYGLOT_*` overrides looked up through `lookup`.
///
/// Recognised keys: `POLYGLOT_HOST`, `POLYGLOT_PORT`, `POLYGLOT_BOT_ADMIN_ID`,
/// `POLYGLOT_INTERCOM_URL`, `POLYGLOT_LANGUAGE_SERVICE_URL`,
/// `POLYGLOT_CACHE_BACKEND`, `POLYGLOT_CACHE_URL`, `POLYGLOT_SINK_URL`.
/// Unparsable values are logged and ignored.
pub fn apply_env_overrides(
    mut config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AppConfig {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get("POLYGLOT_HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("POLYGLOT_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(err) => tracing::warn!("Ignoring POLYGLOT_PORT={port}: {err}"),
        }
    }
    if let Some(admin_id) = get("POLYGLOT_BOT_ADMIN_ID") {
        config.conversation.bot_admin_id = admin_id;
    }
    if let Some(url) = get("POLYGLOT_INTERCOM_URL") {
        config.intercom.base_url = url;
    }
    if let Some(url) = get("POLYGLOT_LANGUAGE_SERVICE_URL") {
        config.language_service.base_url = url;
    }
    if let Some(backend) = get("POLYGLOT_CACHE_BACKEND") {
        match backend.to_lowercase().as_str() {
            "memory" => config.cache.backend = CacheBackend::Memory,
            "sqlite" => config.cache.backend = CacheBackend::Sqlite,
            other => tracing::warn!("Ignoring POLYGLOT_CACHE_BACKEND={other}"),
        }
    }
    if let Some(url) = get("POLYGLOT_CACHE_URL") {
        config.cache.database_url = url;
    }
    if let Some(url) = get("POLYGLOT_SINK_URL") {
        config.sink.database_url = Some(url);
    }
    config
}

/// The Intercom access token from [`INTERCOM_TOKEN_ENV`], if set.
pub fn intercom_token() -> Option<SecretString> {
    std::env::var(INTERCOM_TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .map(SecretString::from)
}
