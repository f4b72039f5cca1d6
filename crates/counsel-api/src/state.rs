//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository and quote-source traits; AppState
//! pins them to the concrete infra implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use counsel_core::analysis::AnalysisService;
use counsel_core::analysis::quote::PlaceholderQuoteSource;
use counsel_core::conversation::service::ConversationService;
use counsel_core::registry::AdvisorRegistry;
use counsel_core::registry::defaults::default_advisors;
use counsel_core::responder::box_responder::BoxAdvisorResponder;
use counsel_core::responder::rule_based::RuleBasedResponder;
use counsel_core::turn::orchestrator::TurnConfig;
use counsel_infra::config::{database_url, load_global_config, resolve_data_dir};
use counsel_infra::sqlite::advisor::SqliteAdvisorRepository;
use counsel_infra::sqlite::conversation::SqliteConversationStore;
use counsel_infra::sqlite::memory::SqliteMemoryStore;
use counsel_infra::sqlite::pool::DatabasePool;
use counsel_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteConversationService =
    ConversationService<SqliteConversationStore, SqliteMemoryStore>;

pub type ConcreteAnalysisService = AnalysisService<PlaceholderQuoteSource>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub conversation_service: Arc<ConcreteConversationService>,
    pub analysis_service: Arc<ConcreteAnalysisService>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state in the resolved data directory.
    pub async fn init() -> anyhow::Result<Self> {
        Self::open(&resolve_data_dir()).await
    }

    /// Connect to the database in `data_dir`, load the registry, wire services.
    pub async fn open(data_dir: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;

        let config = load_global_config(data_dir).await;
        let db_pool = DatabasePool::new(&database_url(data_dir)).await?;

        // Config-provided advisors replace the built-in board on a fresh database.
        let seed = if config.advisors.is_empty() {
            default_advisors()
        } else {
            config.advisors.clone()
        };
        let registry =
            AdvisorRegistry::load(&SqliteAdvisorRepository::new(db_pool.clone()), &seed).await?;

        let responder = Arc::new(BoxAdvisorResponder::new(RuleBasedResponder::with_latency(
            config.simulated_latency(),
        )));

        let conversation_service = ConversationService::new(
            registry.clone(),
            SqliteConversationStore::new(db_pool.clone()),
            SqliteMemoryStore::new(db_pool),
            responder,
            TurnConfig::from_global(&config),
        );
        let analysis_service = AnalysisService::new(registry, PlaceholderQuoteSource);

        tracing::debug!(
            data_dir = %data_dir.display(),
            turn_timeout_ms = config.turn_timeout_ms,
            "Application state ready"
        );

        Ok(Self {
            conversation_service: Arc::new(conversation_service),
            analysis_service: Arc::new(analysis_service),
            config: Arc::new(config),
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Owner to use when a caller does not name one.
    pub fn owner_or_default(&self, owner: Option<String>) -> String {
        owner
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .unwrap_or_else(|| self.config.default_owner_id.clone())
    }
}
