//! hookseal webhook receiver.
//!
//! Main entry point. Loads configuration, builds the delivery validator and
//! serves until shutdown.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use hookseal_api::{server::shutdown_signal, AppState, Config};
use hookseal_core::RealClock;
use tracing::{info, warn};

const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log)?;

    info!("Starting hookseal webhook receiver");

    let addr = config.parse_server_addr()?;
    info!(
        server_addr = %addr,
        request_timeout_secs = config.request_timeout,
        max_payload_bytes = config.max_payload_bytes,
        secret_configured = config.has_secret(),
        "Configuration loaded"
    );

    if !config.has_secret() {
        warn!("FRAMEIO_SECRET_KEY is empty; only deliveries signed with an empty key will verify");
    }

    let state = AppState::from_config(&config, Arc::new(RealClock::new()));

    let mut server_handle = tokio::spawn(hookseal_api::start_server(state, addr));

    info!(addr = %addr, "hookseal is ready to receive webhooks");

    tokio::select! {
        result = &mut server_handle => {
            return result.context("Server task panicked")?.context("Server failed");
        },
        () = shutdown_signal() => {
            info!("Shutdown signal received, starting graceful shutdown");
        },
    }

    tokio::select! {
        () = tokio::time::sleep(SHUTDOWN_GRACE_PERIOD) => {
            info!("Shutdown grace period expired");
        },
        _ = server_handle => {
            info!("Server stopped");
        },
    }

    info!("hookseal shutdown complete");
    Ok(())
}

/// Initializes tracing with the configured filter directives.
fn init_tracing(directives: &str) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_new(directives).context("Invalid RUST_LOG directives")?;

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    Ok(())
}
