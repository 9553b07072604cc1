//! reply-tracker - HTTP server entry point

use std::sync::Arc;

use anyhow::Context;
use reply_tracker::api::{self, AppState};
use reply_tracker::config::Settings;
use reply_tracker::providers::email::SettingsProviderFactory;
use reply_tracker::storage::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = Arc::new(Settings::load().context("loading settings")?);
    tracing::info!(database = %settings.database.path.display(), "Starting reply-tracker");

    let db = Database::open(&settings.database.path)
        .await
        .with_context(|| format!("opening {}", settings.database.path.display()))?;

    let providers = Arc::new(SettingsProviderFactory::new(settings.clone()));
    let app = api::router(AppState::new(db, providers));

    let listener = tokio::net::TcpListener::bind(&settings.server.bind_address)
        .await
        .with_context(|| format!("binding {}", settings.server.bind_address))?;
    tracing::info!(address = %settings.server.bind_address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
