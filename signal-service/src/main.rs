use anyhow::{Context, Result};
use signal_service::config::{load_config, save_config, DEFAULT_CONFIG_PATH};
use signal_service::{build_router, AppState, SignalDesk};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var("SIGNAL_BOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&config_path)?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // `signal-bot init-config` writes the effective configuration and exits
    if std::env::args().nth(1).as_deref() == Some("init-config") {
        save_config(&config, &config_path)?;
        info!("Wrote configuration to {}", config_path);
        return Ok(());
    }

    info!("🚀 Starting signal bot");

    let desk = SignalDesk::from_config(&config)?;
    let app = build_router(AppState { desk: Arc::new(desk) });

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("👋 Shutting down gracefully...");
        })
        .await?;

    Ok(())
}
