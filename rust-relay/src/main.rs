//! Sellauth relay web server.
//!
//! This binary:
//! - Receives Sellauth purchase webhooks on `/webhook/sellauth`
//! - Verifies their HMAC signature
//! - Forwards purchases to key generation, then notifies Discord
//! - Announces itself on Discord once listening

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relay::outbound::send_startup_notification;
use relay::web::{is_signing_enabled, WEBHOOK_PATH};
use relay::{router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("relay_server_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        discord_configured = config.discord_webhook_url.is_some(),
        keygen_configured = config.keygen_webhook_url.is_some(),
        sellauth_signing_configured = is_signing_enabled(&config.sellauth_hmac_secret),
        keygen_signing_configured = is_signing_enabled(&config.keygen_hmac_secret),
        require_signature = config.require_signature,
        sign_raw_body = config.sign_raw_body,
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );

    if config.keygen_webhook_url.is_none() {
        warn!("keygen_url_not_configured");
    }

    let state = AppState::new(config.clone()).context("Failed to create HTTP client")?;

    let app = router(state.clone());

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, webhook_path = WEBHOOK_PATH, "relay_server_listening");

    if config.startup_notification {
        let startup_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) =
                send_startup_notification(&startup_state.client, &startup_state.config).await
            {
                warn!(error = %e, "discord_startup_notification_failed");
            }
        });
    }

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("relay_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("relay_server_shutting_down");
}
