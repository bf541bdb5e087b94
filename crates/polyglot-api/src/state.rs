//! Application state wiring the relay together.
//!
//! The core pipeline is generic over its ports; AppState pins it to the
//! concrete infra implementations selected by configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use polyglot_core::analysis::ContextAccumulator;
use polyglot_core::cache::{Cache, MemoryCache};
use polyglot_core::handler::HandlerContext;
use polyglot_core::intake::{EventIntake, IdempotencyGuard};
use polyglot_core::language::TranslationOrchestrator;
use polyglot_core::router::EventRouter;
use polyglot_core::sink::{ResultSink, SinkError, TracingSink};
use polyglot_core::state::{ConversationLocks, ConversationStateStore};
use polyglot_infra::config::{INTERCOM_TOKEN_ENV, intercom_token};
use polyglot_infra::language::HttpLanguageService;
use polyglot_infra::messaging::IntercomClient;
use polyglot_infra::sqlite::{DatabasePool, SqliteCache, SqliteResultSink};
use polyglot_types::config::{AppConfig, CacheBackend};
use polyglot_types::error::CacheError;
use polyglot_types::result::{DomainException, ProcessingResult};
use secrecy::SecretString;

/// Cache selected by `[cache] backend`.
pub enum ConfiguredCache {
    Memory(MemoryCache),
    Sqlite(SqliteCache),
}

impl Cache for ConfiguredCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            Self::Memory(cache) => cache.get(key).await,
            Self::Sqlite(cache) => cache.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        match self {
            Self::Memory(cache) => cache.set(key, value, ttl).await,
            Self::Sqlite(cache) => cache.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self {
            Self::Memory(cache) => cache.delete(key).await,
            Self::Sqlite(cache) => cache.delete(key).await,
        }
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool, CacheError> {
        match self {
            Self::Memory(cache) => cache.set_nx(key, value, ttl).await,
            Self::Sqlite(cache) => cache.set_nx(key, value, ttl).await,
        }
    }
}

/// Sink selected by `[sink] database_url`: log-only when unset.
pub enum ConfiguredSink {
    Tracing(TracingSink),
    Sqlite(SqliteResultSink),
}

impl ResultSink for ConfiguredSink {
    async fn record_result(&self, result: &ProcessingResult) -> Result<(), SinkError> {
        match self {
            Self::Tracing(sink) => sink.record_result(result).await,
            Self::Sqlite(sink) => sink.record_result(result).await,
        }
    }

    async fn record_exception(&self, exception: &DomainException) -> Result<(), SinkError> {
        match self {
            Self::Tracing(sink) => sink.record_exception(exception).await,
            Self::Sqlite(sink) => sink.record_exception(exception).await,
        }
    }
}

/// Concrete type alias for the intake pipeline pinned to infra implementations.
pub type ConcreteIntake = EventIntake<
    ConfiguredCache,
    HttpLanguageService,
    HttpLanguageService,
    IntercomClient,
    ConfiguredSink,
>;

/// Shared application state.
///
/// Used by both the webhook server and the replay command.
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<ConcreteIntake>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the relay from `config`, reading the Intercom token from the
    /// environment.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let token = intercom_token()
            .with_context(|| format!("{INTERCOM_TOKEN_ENV} must be set to reply to conversations"))?;
        Self::build(config, token).await
    }

    /// Wire the relay from `config` and an explicit Intercom token.
    pub async fn build(config: AppConfig, intercom_token: SecretString) -> anyhow::Result<Self> {
        if config.conversation.bot_admin_id.is_empty() {
            tracing::warn!("conversation.bot_admin_id is empty; notes will have no author");
        }

        let cache_pool = match config.cache.backend {
            CacheBackend::Memory => None,
            CacheBackend::Sqlite => Some(
                DatabasePool::new(&config.cache.database_url)
                    .await
                    .with_context(|| format!("failed to open cache at {}", config.cache.database_url))?,
            ),
        };

        let sink = match &config.sink.database_url {
            None => ConfiguredSink::Tracing(TracingSink),
            Some(url) => {
                // One writer per file: reuse the cache pool when both point at the same database.
                let pool = match &cache_pool {
                    Some(pool) if *url == config.cache.database_url => pool.clone(),
                    _ => DatabasePool::new(url)
                        .await
                        .with_context(|| format!("failed to open result sink at {url}"))?,
                };
                ConfiguredSink::Sqlite(SqliteResultSink::new(pool))
            }
        };

        let cache = Arc::new(match cache_pool {
            None => ConfiguredCache::Memory(MemoryCache::new()),
            Some(pool) => ConfiguredCache::Sqlite(SqliteCache::new(pool)),
        });

        let timeouts = &config.timeouts;
        let cache_timeout = Duration::from_millis(timeouts.cache_ms);
        let language_timeout = Duration::from_millis(timeouts.language_ms);

        let language = HttpLanguageService::new(&config.language_service.base_url)?;
        let messaging = IntercomClient::new(&config.intercom.base_url, intercom_token)?;

        let handlers = HandlerContext {
            store: ConversationStateStore::new(
                Arc::clone(&cache),
                Duration::from_secs(config.conversation.ttl_secs),
                cache_timeout,
            ),
            locks: ConversationLocks::new(),
            translator: TranslationOrchestrator::new(language.clone(), language_timeout),
            accumulator: ContextAccumulator::new(language, language_timeout),
            messaging,
            bot_admin_id: config.conversation.bot_admin_id.clone(),
            messaging_timeout: Duration::from_millis(timeouts.messaging_ms),
        };

        // ttl_secs = 0 keeps markers until the cache is cleared.
        let idempotency_ttl = match config.idempotency.ttl_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let guard = IdempotencyGuard::new(cache, idempotency_ttl, cache_timeout);

        let intake = EventIntake::new(guard, EventRouter::new(handlers, sink));

        tracing::info!(
            cache = ?config.cache.backend,
            sink = if config.sink.database_url.is_some() { "sqlite" } else { "tracing" },
            language_service = %config.language_service.base_url,
            "relay wired"
        );

        Ok(Self {
            intake: Arc::new(intake),
            config: Arc::new(config),
        })
    }
}
