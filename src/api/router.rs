//! HTTP routing configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::app::AppState;

use super::handlers::{
    accounts_handler, balance_handler, chain_id_handler, contract_message_handler,
    health_check_handler, liveness_handler, login_handler, logout_handler, metrics_handler,
    private_key_handler, readiness_handler, send_contract_transaction_handler,
    send_transaction_handler, session_handler, sign_message_handler,
};
use super::middleware::auth_middleware;

/// Request bodies are tiny JSON objects; anything larger is rejected.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the application router.
///
/// Mutating routes require the `x-api-key` header. Transaction routes wait
/// for a receipt, so the request timeout should exceed the receipt timeout
/// when long confirmations are expected.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_router_with_timeout(app_state, Duration::from_secs(30))
}

pub fn create_router_with_timeout(app_state: Arc<AppState>, request_timeout: Duration) -> Router {
    let layers = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ));

    let session_routes = Router::new().route(
        "/",
        post(login_handler).get(session_handler).delete(logout_handler),
    );

    let contract_routes = Router::new()
        .route("/transactions", post(send_contract_transaction_handler))
        .route("/message", get(contract_message_handler));

    let health_routes = Router::new()
        .route("/", get(health_check_handler))
        .route("/live", get(liveness_handler))
        .route("/ready", get(readiness_handler));

    Router::new()
        .nest("/session", session_routes)
        .route("/chain-id", get(chain_id_handler))
        .route("/accounts", get(accounts_handler))
        .route("/balance", get(balance_handler))
        .route("/transactions", post(send_transaction_handler))
        .nest("/contract", contract_routes)
        .route("/messages/sign", post(sign_message_handler))
        .route("/private-key", post(private_key_handler))
        .nest("/health", health_routes)
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&app_state),
            auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(layers)
        .with_state(app_state)
}
