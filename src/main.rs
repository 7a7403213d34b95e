use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::{info, warn};

use social_wallet_rpc::api::create_router_with_timeout;
use social_wallet_rpc::app::{AppState, SessionManager};
use social_wallet_rpc::config::AppConfig;
use social_wallet_rpc::infra::{NodeAuthProvider, init_metrics_handle, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(config.log_format).context("Failed to initialize logging")?;

    let metrics = init_metrics_handle();
    if metrics.is_none() {
        warn!("Metrics recorder unavailable, /metrics is disabled");
    }

    if config.node.exported_key.is_some() {
        warn!("WALLET_PRIVATE_KEY is set; the key is served to authenticated callers");
    }

    // Long enough for a transaction route to wait out the receipt deadline
    let request_timeout = config.rpc.receipt_timeout + config.node.provider.timeout;

    let auth = Arc::new(NodeAuthProvider::new(config.node.clone()));
    let session = Arc::new(SessionManager::new(auth, config.rpc.clone()));
    let app_state =
        Arc::new(AppState::new(session, config.api_auth_key.clone()).with_metrics(metrics));

    let router = create_router_with_timeout(app_state, request_timeout);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    info!(
        addr = %config.bind_addr,
        rpc_url = %config.node.rpc_url,
        "Server starting"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
