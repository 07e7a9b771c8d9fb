//! atelier-cp - Curation Pipeline Microservice
//!
//! Discovers candidate artists and artworks from heterogeneous
//! cultural-heritage sources, reconciles and scores them, and drives the
//! interactive curation workflow through to an exhibition proposal.
//!
//! Integrates with operator UIs via HTTP REST + SSE.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use atelier_cp::config::CpConfig;
use atelier_cp::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Resolve configuration first so the log filter can come from it
    let config = CpConfig::resolve().map_err(|e| anyhow::anyhow!("Config resolution failed: {}", e))?;

    // Initialize tracing; RUST_LOG overrides the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting atelier-cp (Curation Pipeline) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Create application state (adapters, scorer, registry, event bus)
    let state = AppState::from_config(&config);

    // Build router
    let app = atelier_cp::build_router(state);

    // Start server
    let listener =
        tokio::net::TcpListener::bind(("127.0.0.1", config.listen_port)).await?;
    info!("Listening on http://127.0.0.1:{}", config.listen_port);
    info!(
        "Health check: http://127.0.0.1:{}/health",
        config.listen_port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
