//! Application State
//!
//! Everything the handlers share: the store, the completion client behind the
//! orchestrator, and startup metadata. Built once in main() and passed down;
//! no module-level globals.

use std::sync::Arc;
use tracing::{info, warn};

use agentdesk_agents::builtin_agent_descriptors;
use agentdesk_core::AppConfig;
use agentdesk_llm::{client::BoxedClient, OpenAiClient};
use agentdesk_store::{AgentRecord, SqliteStore};

use crate::orchestrator::ChatOrchestrator;

/// Application state shared across all handlers
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub orchestrator: ChatOrchestrator,
    pub model: String,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        info!("Initializing application state...");

        let store = Arc::new(SqliteStore::new(&config.database_url).await?);

        seed_agent_catalog(&store).await?;
        if let Err(e) = store.cleanup_expired_sessions().await {
            warn!("Session cleanup failed: {}", e);
        }

        let completion: BoxedClient = Arc::new(OpenAiClient::new(&config.openai_api_key)?);

        info!("Completion model: {}", config.model);
        info!("Application state initialized successfully");

        Ok(Self::with_components(store, completion, config.model.clone()))
    }

    /// Assemble state from already-built parts. Tests use this to swap in an
    /// in-memory store and a stubbed completion client.
    pub fn with_components(store: Arc<SqliteStore>, completion: BoxedClient, model: String) -> Self {
        let orchestrator = ChatOrchestrator::new(store.clone(), completion, model.clone());
        Self {
            store,
            orchestrator,
            model,
            start_time: std::time::Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Write the built-in agent descriptors into the catalog table.
///
/// The picker reads the catalog from the store while the orchestrator
/// resolves instructions from the in-process registry; seeding from the same
/// descriptor table is what keeps the identifiers aligned.
pub async fn seed_agent_catalog(store: &SqliteStore) -> anyhow::Result<()> {
    let descriptors = builtin_agent_descriptors();
    let count = descriptors.len();

    for descriptor in descriptors {
        store
            .upsert_agent(&AgentRecord {
                id: descriptor.id,
                name: descriptor.name,
                group: descriptor.group,
                description: descriptor.description,
            })
            .await?;
    }

    info!("Seeded {} agents into the catalog", count);
    Ok(())
}
