//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use secrecy::ExposeSecret;
use tracing::error;

use crate::app::AppState;
use crate::domain::{
    AccountResponse, AppError, AuthError, BalanceResponse, ChainIdResponse,
    ContractMessageResponse, ErrorDetail, ErrorResponse, HealthResponse, HealthStatus,
    PrivateKeyResponse, ProviderError, RpcError, SessionResponse, SignMessageRequest,
    SignatureResponse, TransactionReceipt,
};

/// Log in through the wallet-auth provider
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.session.login().await?;
    Ok(Json(session))
}

/// Current session, logged in or not
pub async fn session_handler(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    Json(state.session.snapshot().await)
}

/// Log out and close the provider handle
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    state.session.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn chain_id_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChainIdResponse>, AppError> {
    let chain_id = state.session.rpc().await?.get_chain_id().await?;
    Ok(Json(ChainIdResponse { chain_id }))
}

pub async fn accounts_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AccountResponse>, AppError> {
    let address = state.session.rpc().await?.get_accounts().await?;
    Ok(Json(AccountResponse { address }))
}

/// Balance of the session account in whole-token units
pub async fn balance_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BalanceResponse>, AppError> {
    let balance = state.session.rpc().await?.get_balance().await?;
    Ok(Json(BalanceResponse { balance }))
}

/// Send the configured transfer and wait for its receipt
pub async fn send_transaction_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TransactionReceipt>, AppError> {
    let receipt = state.session.rpc().await?.send_transaction().await?;
    Ok(Json(receipt))
}

/// Write the configured message to the contract and wait for the receipt
pub async fn send_contract_transaction_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TransactionReceipt>, AppError> {
    let receipt = state
        .session
        .rpc()
        .await?
        .send_contract_transaction()
        .await?;
    Ok(Json(receipt))
}

pub async fn contract_message_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ContractMessageResponse>, AppError> {
    let message = state.session.rpc().await?.read_contract().await?;
    Ok(Json(ContractMessageResponse { message }))
}

pub async fn sign_message_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignMessageRequest>,
) -> Result<Json<SignatureResponse>, AppError> {
    let signature = state
        .session
        .rpc()
        .await?
        .sign_message(&request.message)
        .await?;
    Ok(Json(SignatureResponse { signature }))
}

/// Export the session's private key
pub async fn private_key_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PrivateKeyResponse>, AppError> {
    let key = state.session.rpc().await?.get_private_key().await?;
    Ok(Json(PrivateKeyResponse {
        private_key: key.expose_secret().to_string(),
    }))
}

/// Detailed health check
pub async fn health_check_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let health = state.session.health().await;
    Json(health)
}

/// Kubernetes liveness probe
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe
pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    let health = state.session.health().await;
    match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Prometheus scrape endpoint
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_type) = match &self {
            AppError::Rpc(RpcError::Provider(ProviderError::Disconnected)) => {
                (StatusCode::UNAUTHORIZED, "not_logged_in")
            }
            AppError::Rpc(_) => (StatusCode::BAD_GATEWAY, "rpc_error"),
            AppError::Auth(auth_err) => match auth_err {
                AuthError::NotConnected => (StatusCode::UNAUTHORIZED, "not_logged_in"),
                AuthError::ConnectionFailed(_) => {
                    (StatusCode::BAD_GATEWAY, "wallet_connection_error")
                }
            },
            AppError::NotLoggedIn => (StatusCode::UNAUTHORIZED, "not_logged_in"),
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, "authentication_error"),
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(error_type = %error_type, message = %message, "Server error");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                r#type: error_type.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}
