//! dex-wrapper server entry point.
//!
//! Deploys the wrapper and starts the Axum HTTP server with REST and
//! WebSocket endpoints.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use dex_wrapper::api;
use dex_wrapper::app_state::AppState;
use dex_wrapper::config::DexConfig;
use dex_wrapper::domain::EventBus;
use dex_wrapper::service::{Deployment, DexService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = DexConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting dex-wrapper");

    // Deploy the wrapper over its ledger and gateway
    let deployment = Deployment::new(&config)?;
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let dex_service = Arc::new(DexService::new(
        deployment,
        event_bus.clone(),
        config.default_deadline_secs,
    ));

    // Build application state
    let app_state = AppState {
        dex_service,
        event_bus,
    };

    // Build router
    let app = api::build_app(app_state, config.request_timeout());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
