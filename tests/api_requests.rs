//! Integration tests for the HTTP request flows.

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use social_wallet_rpc::api::create_router;
use social_wallet_rpc::app::{AppState, RpcSettings, SessionManager};
use social_wallet_rpc::domain::{
    AccountResponse, BalanceResponse, ChainIdResponse, ContractMessageResponse, ErrorResponse,
    HealthResponse, HealthStatus, PrivateKeyResponse, SessionResponse, SignatureResponse,
    TransactionReceipt, UserInfo, abi,
};
use social_wallet_rpc::test_utils::{MockAuthProvider, MockWalletProvider};

const API_KEY: &str = "test-api-key";
const ACCOUNT: &str = "0x1111111111111111111111111111111111111111";

fn tx_hash() -> String {
    format!("0x{}", "cd".repeat(32))
}

fn create_test_app() -> (Router, Arc<MockWalletProvider>) {
    let message = abi::encode_string_call("update(string)", "on-chain message");
    let provider = Arc::new(
        MockWalletProvider::with_account(ACCOUNT)
            .with_response("eth_chainId", json!("0x1"))
            .with_response("eth_getBalance", json!("1000000000000000000"))
            .with_response("eth_sendTransaction", json!(tx_hash()))
            .with_response(
                "eth_getTransactionReceipt",
                json!({ "transactionHash": tx_hash(), "status": "0x1" }),
            )
            .with_response(
                "eth_call",
                json!(format!("0x{}", hex::encode(&message[4..]))),
            )
            .with_response("personal_sign", json!("0xsigned"))
            .with_response("eth_private_key", json!("privateKey")),
    );
    let auth = Arc::new(
        MockAuthProvider::new(Arc::clone(&provider))
            .with_user(UserInfo::new("Test User", "user@example.com")),
    );
    let settings = RpcSettings {
        receipt_poll_interval: Duration::from_millis(10),
        receipt_timeout: Duration::from_secs(1),
        ..RpcSettings::default()
    };
    let session = Arc::new(SessionManager::new(auth, settings));
    let state = Arc::new(AppState::new(session, SecretString::from(API_KEY)));
    (create_router(state), provider)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn authed(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", API_KEY);
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

async fn send_json<T: DeserializeOwned>(router: &Router, request: Request<Body>) -> (StatusCode, T) {
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn login(router: &Router) -> SessionResponse {
    let (status, session) = send_json(router, authed("POST", "/session", None)).await;
    assert_eq!(status, StatusCode::OK);
    session
}

#[tokio::test]
async fn test_full_session_flow() {
    let (router, _) = create_test_app();

    // 1. Logged out
    let (status, session): (_, SessionResponse) = send_json(&router, get("/session")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!session.logged_in);

    // 2. Log in
    let session = login(&router).await;
    assert!(session.logged_in);
    assert_eq!(
        session.user,
        Some(UserInfo::new("Test User", "user@example.com"))
    );

    // 3. Session is visible
    let (_, current): (_, SessionResponse) = send_json(&router, get("/session")).await;
    assert_eq!(current.session_id, session.session_id);

    // 4. Log out
    let (status, _) = send(&router, authed("DELETE", "/session", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, after): (_, SessionResponse) = send_json(&router, get("/session")).await;
    assert!(!after.logged_in);
}

#[tokio::test]
async fn test_read_routes() {
    let (router, _) = create_test_app();
    login(&router).await;

    let (status, chain): (_, ChainIdResponse) = send_json(&router, get("/chain-id")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chain.chain_id.0, 1);

    let (_, account): (_, AccountResponse) = send_json(&router, get("/accounts")).await;
    assert_eq!(account.address.to_string(), ACCOUNT);

    let (_, balance): (_, BalanceResponse) = send_json(&router, get("/balance")).await;
    assert_eq!(balance.balance, "1");

    let (_, message): (_, ContractMessageResponse) =
        send_json(&router, get("/contract/message")).await;
    assert_eq!(message.message, "on-chain message");
}

#[tokio::test]
async fn test_transaction_routes_return_receipts() {
    let (router, provider) = create_test_app();
    login(&router).await;

    let (status, receipt): (_, TransactionReceipt) =
        send_json(&router, authed("POST", "/transactions", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt.transaction_hash.to_string(), tx_hash());

    let (status, _): (_, TransactionReceipt) =
        send_json(&router, authed("POST", "/contract/transactions", None)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(provider.calls_for("eth_sendTransaction").len(), 2);
}

#[tokio::test]
async fn test_receipt_serializes_transaction_hash() {
    let (router, _) = create_test_app();
    login(&router).await;

    let (_, body): (_, Value) = send_json(&router, authed("POST", "/transactions", None)).await;
    assert_eq!(body["transactionHash"], tx_hash());
}

#[tokio::test]
async fn test_sign_message_route() {
    let (router, provider) = create_test_app();
    login(&router).await;

    let (status, signature): (_, SignatureResponse) = send_json(
        &router,
        authed("POST", "/messages/sign", Some(json!({ "message": "hi" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(signature.signature, "0xsigned");
    assert_eq!(provider.calls_for("personal_sign")[0][0], "0x6869");
}

#[tokio::test]
async fn test_private_key_route() {
    let (router, _) = create_test_app();
    login(&router).await;

    let (status, key): (_, PrivateKeyResponse) =
        send_json(&router, authed("POST", "/private-key", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(key.private_key, "privateKey");
}

#[tokio::test]
async fn test_routes_require_session() {
    let (router, provider) = create_test_app();

    for uri in ["/chain-id", "/accounts", "/balance", "/contract/message"] {
        let (status, body): (_, ErrorResponse) = send_json(&router, get(uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body.error.r#type, "not_logged_in");
    }

    let (status, _) = send(&router, authed("POST", "/transactions", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_mutating_routes_require_api_key() {
    let (router, provider) = create_test_app();
    login(&router).await;

    for uri in ["/transactions", "/contract/transactions", "/private-key"] {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    assert!(provider.calls_for("eth_sendTransaction").is_empty());
    assert!(provider.calls_for("eth_private_key").is_empty());
}

#[tokio::test]
async fn test_rpc_rejection_is_bad_gateway() {
    let (router, provider) = create_test_app();
    login(&router).await;
    provider.set_rejection("eth_getBalance", "Error");

    let (status, body): (_, ErrorResponse) = send_json(&router, get("/balance")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body.error.r#type, "rpc_error");
    assert_eq!(body.error.message, "Error");
}

#[tokio::test]
async fn test_sign_message_malformed_json() {
    let (router, _) = create_test_app();
    login(&router).await;

    let request = Request::builder()
        .method("POST")
        .uri("/messages/sign")
        .header("x-api-key", API_KEY)
        .header("Content-Type", "application/json")
        .body(Body::from("{ invalid json }"))
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_health_check() {
    let (router, provider) = create_test_app();

    let (status, health): (_, HealthResponse) = send_json(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health.status, HealthStatus::Degraded);
    assert!(!health.logged_in);

    login(&router).await;
    let (_, health): (_, HealthResponse) = send_json(&router, get("/health")).await;
    assert_eq!(health.status, HealthStatus::Healthy);

    provider.set_rejection("eth_chainId", "node down");
    let (status, _) = send(&router, get("/health/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_liveness() {
    let (router, _) = create_test_app();

    let (status, _) = send(&router, get("/health/live")).await;
    assert_eq!(status, StatusCode::OK);
}
