use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::app::{app, AppState};
use crate::auth::JwtIdentityResolver;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: &AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    info!("Starting timetracker API in {:?} mode", config.environment);

    let resolver = JwtIdentityResolver::from_config(&config.security)
        .context("no token verification configured; set SECURITY_JWT_SECRET or SECURITY_JWKS_URL")?;
    let manager = DatabaseManager::connect(&config.database, config.is_development())
        .await
        .context("failed to initialize storage")?;

    let state = AppState::from_manager(&manager, Arc::new(resolver));
    let router = app(state, config);

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(config.api.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    manager.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
