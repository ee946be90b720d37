//! senti-server entry point.

use anyhow::{Context, Result};
use senti_common::config::Config;
use senti_common::logging::init_logging;
use senti_server::{build_router, ServiceState};
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();

    let config_path = std::env::var_os("SENTI_CONFIG").map(std::path::PathBuf::from);
    let config = Config::load_with_env(config_path.as_deref())?;
    init_logging(&config.observability);

    tracing::info!("Senti Server v{}", env!("CARGO_PKG_VERSION"));

    config.validate().context("Invalid configuration")?;

    let state = ServiceState::from_config(&config);
    if !state.credentials_configured {
        tracing::warn!("No Gemini API key configured; analysis requests will fail");
    }

    // Build router with CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(state).layer(cors);

    let addr = config.listen_address();

    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );

    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
