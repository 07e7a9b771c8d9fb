//! atelier-cp library interface
//!
//! Exposes the application state, router, and pipeline services for
//! integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod sources;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use atelier_common::events::EventBus;

use crate::config::CpConfig;
use crate::services::orchestrator::PipelineSettings;
use crate::services::{
    CandidateHarvester, CategoryRules, CheckpointCoordinator, DiversityRanker, EventBusSink,
    LlmStrategy, Scorer, SessionRegistry, StageOrchestrator,
};
use crate::sources::{ChatCompletionClient, EuropeanaClient, GettyUlanClient, SourceAdapter, WikidataClient};

const EVENT_BUS_CAPACITY: usize = 100;
const HARVEST_CONCURRENCY: usize = 4;
const HARVEST_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session registry (explicitly injected, no global singleton)
    pub registry: Arc<SessionRegistry>,
    /// Checkpoint coordinator for the selection handshake
    pub coordinator: Arc<CheckpointCoordinator>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Pipeline orchestrator
    pub orchestrator: Arc<StageOrchestrator>,
    /// Cancellation tokens for active curation sessions
    pub cancellation_tokens: Arc<RwLock<HashMap<Uuid, CancellationToken>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    /// Build state from resolved configuration
    pub fn from_config(config: &CpConfig) -> Self {
        let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

        if config.sources.wikidata_enabled {
            match WikidataClient::new() {
                Ok(client) => adapters.push(Arc::new(client)),
                Err(e) => tracing::error!("Failed to initialize Wikidata client: {}", e),
            }
        }
        if config.sources.getty_enabled {
            match GettyUlanClient::new() {
                Ok(client) => adapters.push(Arc::new(client)),
                Err(e) => tracing::error!("Failed to initialize Getty client: {}", e),
            }
        }
        if let Some(key) = &config.sources.europeana_api_key {
            match EuropeanaClient::new(key.clone()) {
                Ok(client) => adapters.push(Arc::new(client)),
                Err(e) => tracing::error!("Failed to initialize Europeana client: {}", e),
            }
        }

        let scorer = match (&config.llm.api_key, config.llm.enabled()) {
            (Some(key), true) => {
                match ChatCompletionClient::new(
                    config.llm.base_url.clone(),
                    key.clone(),
                    config.llm.model.clone(),
                ) {
                    Ok(client) => Scorer::with_llm(LlmStrategy::new(Arc::new(client))),
                    Err(e) => {
                        tracing::error!("Failed to initialize LLM client: {}", e);
                        Scorer::heuristic_only()
                    }
                }
            }
            _ => Scorer::heuristic_only(),
        };

        Self::with_components(
            adapters,
            scorer,
            DiversityRanker::new(CategoryRules::default()),
            PipelineSettings::default(),
        )
    }

    /// Build state from explicit components (used by tests to substitute
    /// in-memory adapters and canned scorers)
    pub fn with_components(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        scorer: Scorer,
        ranker: DiversityRanker,
        settings: PipelineSettings,
    ) -> Self {
        let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
        let registry = Arc::new(SessionRegistry::new());
        let coordinator = Arc::new(CheckpointCoordinator::new());

        let harvester =
            CandidateHarvester::new(adapters, HARVEST_CONCURRENCY, HARVEST_CALL_TIMEOUT);
        let progress = Arc::new(EventBusSink::new(event_bus.clone()));
        let orchestrator = Arc::new(StageOrchestrator::new(
            coordinator.clone(),
            harvester,
            scorer,
            ranker,
            progress,
            event_bus.clone(),
            settings,
        ));

        Self {
            registry,
            coordinator,
            event_bus,
            orchestrator,
            cancellation_tokens: Arc::new(RwLock::new(HashMap::new())),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::curation_routes())
        .route("/events", get(api::event_stream))
        .route("/curation/events", get(api::curation_event_stream))
        .merge(api::health_routes())
        .with_state(state)
}
