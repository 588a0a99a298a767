//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! `ChatService` is generic over the session store; AppState pins it to
//! [`SessionBackend`], which picks SQLite or memory at startup.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};

use dollsay_core::chat::service::ChatService;
use dollsay_core::emotion::EmotionClassifier;
use dollsay_core::llm::box_provider::BoxLlmProvider;
use dollsay_core::llm::companion::CompanionReplier;
use dollsay_core::repository::session::SessionStore;
use dollsay_infra::config::{API_KEY_ENV, resolve_api_key};
use dollsay_infra::llm::create_provider;
use dollsay_infra::memory::InMemorySessionStore;
use dollsay_infra::sqlite::pool::{DatabasePool, database_url};
use dollsay_infra::sqlite::session::SqliteSessionStore;
use dollsay_types::config::AppConfig;
use dollsay_types::error::RepositoryError;
use dollsay_types::session::{Admission, GuestSession};

/// Session store selected at startup.
pub enum SessionBackend {
    Sqlite(SqliteSessionStore),
    Memory(InMemorySessionStore),
}

impl SessionBackend {
    /// Open the SQLite store under `data_dir`, or an empty in-memory store.
    pub async fn open(data_dir: &Path, in_memory: bool) -> anyhow::Result<Self> {
        if in_memory {
            tracing::info!("Using in-memory session store; quota records are lost on exit");
            return Ok(Self::Memory(InMemorySessionStore::new()));
        }

        tokio::fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let pool = DatabasePool::new(&database_url(data_dir))
            .await
            .context("Failed to open session database")?;
        Ok(Self::Sqlite(SqliteSessionStore::new(pool)))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Memory(_) => "memory",
        }
    }
}

impl SessionStore for SessionBackend {
    async fn get(&self, session_id: &str) -> Result<Option<GuestSession>, RepositoryError> {
        match self {
            Self::Sqlite(store) => store.get(session_id).await,
            Self::Memory(store) => store.get(session_id).await,
        }
    }

    async fn get_or_create(&self, session_id: &str) -> Result<GuestSession, RepositoryError> {
        match self {
            Self::Sqlite(store) => store.get_or_create(session_id).await,
            Self::Memory(store) => store.get_or_create(session_id).await,
        }
    }

    async fn increment(&self, session_id: &str) -> Result<GuestSession, RepositoryError> {
        match self {
            Self::Sqlite(store) => store.increment(session_id).await,
            Self::Memory(store) => store.increment(session_id).await,
        }
    }

    async fn try_admit(&self, session_id: &str, limit: u32) -> Result<Admission, RepositoryError> {
        match self {
            Self::Sqlite(store) => store.try_admit(session_id, limit).await,
            Self::Memory(store) => store.try_admit(session_id, limit).await,
        }
    }
}

/// Concrete chat service pinned to the runtime-selected store.
pub type ConcreteChatService = ChatService<SessionBackend>;

/// Shared application state.
///
/// Cheap to clone; handed to axum as router state.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the chat service from already-built parts.
    pub fn new(store: SessionBackend, provider: BoxLlmProvider, config: AppConfig) -> Self {
        let replier = CompanionReplier::new(
            provider,
            Duration::from_secs(config.provider.timeout_secs),
        );
        let classifier = EmotionClassifier::new(config.emotion.rules.clone());
        let chat_service = ChatService::new(store, replier, classifier, config.guest.max_messages);

        Self {
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
        }
    }

    /// Initialize the application state: open the store, build the provider.
    pub async fn init(config: AppConfig, data_dir: &Path, in_memory: bool) -> anyhow::Result<Self> {
        config.validate()?;

        let provider = build_provider(&config)?;
        let store = SessionBackend::open(data_dir, in_memory).await?;

        tracing::info!(
            provider = %provider.name(),
            model = %config.provider.model,
            store = store.kind(),
            quota = config.guest.max_messages,
            "Application state initialized"
        );

        Ok(Self::new(store, provider, config))
    }
}

/// Build the configured provider, failing if no API key is available.
pub fn build_provider(config: &AppConfig) -> anyhow::Result<BoxLlmProvider> {
    let Some(api_key) = resolve_api_key(config) else {
        bail!("No API key configured: set {API_KEY_ENV} or provider.api_key in config.toml");
    };
    Ok(create_provider(&config.provider, api_key)?)
}
