//! giveaway-gateway server entry point.
//!
//! Opens the store, starts the expiry sweeper and serves the REST and
//! WebSocket endpoints until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use giveaway_gateway::api;
use giveaway_gateway::app_state::AppState;
use giveaway_gateway::config::GatewayConfig;
use giveaway_gateway::domain::{EventBus, WinnerSelector};
use giveaway_gateway::persistence::{GiveawayStore, MemoryGiveawayStore, PostgresGiveawayStore};
use giveaway_gateway::tasks::ExpirySweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("invalid configuration")?;
    tracing::info!(addr = %config.listen_addr, "starting giveaway-gateway");

    // Open the store
    let store: Arc<dyn GiveawayStore> = if config.persistence_enabled {
        let pg = PostgresGiveawayStore::connect(&config)
            .await
            .context("failed to connect to PostgreSQL")?;
        pg.migrate().await.context("failed to run migrations")?;
        tracing::info!("using PostgreSQL giveaway store");
        Arc::new(pg)
    } else {
        tracing::warn!("persistence disabled; giveaways live in memory only");
        Arc::new(MemoryGiveawayStore::new())
    };

    // Build service layer
    let event_bus = EventBus::new(config.event_bus_capacity);
    let app_state = AppState::new(
        &store,
        event_bus,
        Arc::new(WinnerSelector::from_entropy()),
        config.limits,
        config.reroll_policy,
    );

    // Start the expiry sweeper; its first tick recovers giveaways that
    // expired while the process was down.
    let sweeper = ExpirySweeper::new(
        Arc::clone(&store),
        Arc::clone(&app_state.completion),
        config.scheduler_interval(),
        config.repair_grace(),
    )
    .spawn();

    // Build router
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sweeper.abort();
    tracing::info!("giveaway-gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
