//! JSON-RPC over HTTP wallet provider.
//!
//! Sends EIP-1193 style requests to an Ethereum node. The node signs
//! `eth_sendTransaction` with its own unlocked accounts.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::domain::{ProviderError, WalletProvider};

/// Methods that must never be resent after a transport failure.
const NON_IDEMPOTENT_METHODS: &[&str] = &["eth_sendTransaction", "eth_sendRawTransaction"];

/// Configuration for the HTTP provider
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    /// `None` when the field is absent, `Some(Null)` for an explicit null.
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// A key the node does not expose, answered locally for one method.
struct ExportedKey {
    method: String,
    key: SecretString,
}

/// Wallet provider backed by a JSON-RPC node
pub struct HttpWalletProvider {
    http_client: Client,
    rpc_url: String,
    config: HttpProviderConfig,
    next_id: AtomicU64,
    disconnected: AtomicBool,
    exported_key: Option<ExportedKey>,
}

impl HttpWalletProvider {
    /// Create a new provider with custom configuration
    pub fn new(rpc_url: &str, config: HttpProviderConfig) -> Result<Self, ProviderError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Connection(e.to_string()))?;
        info!(rpc_url = %rpc_url, "Created wallet provider");
        Ok(Self {
            http_client,
            rpc_url: rpc_url.to_string(),
            config,
            next_id: AtomicU64::new(1),
            disconnected: AtomicBool::new(false),
            exported_key: None,
        })
    }

    /// Answer `method` locally with `key` instead of forwarding it.
    #[must_use]
    pub fn with_exported_key(mut self, method: impl Into<String>, key: SecretString) -> Self {
        self.exported_key = Some(ExportedKey {
            method: method.into(),
            key,
        });
        self
    }

    /// Close this handle. Every later request fails with `Disconnected`.
    pub fn invalidate(&self) {
        self.disconnected.store(true, Ordering::Relaxed);
        debug!(rpc_url = %self.rpc_url, "Wallet provider invalidated");
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Relaxed)
    }

    /// Execute a single RPC call
    async fn do_rpc_call(&self, method: &str, params: &Value) -> Result<Value, ProviderError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        let rpc_response: JsonRpcResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(ProviderError::Connection(format!("HTTP {status}")));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = rpc_response.error {
            return Err(ProviderError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        if !status.is_success() {
            return Err(ProviderError::Connection(format!("HTTP {status}")));
        }

        rpc_response
            .result
            .ok_or_else(|| ProviderError::InvalidResponse("Empty response".to_string()))
    }
}

fn is_transient(err: &ProviderError) -> bool {
    matches!(err, ProviderError::Connection(_) | ProviderError::Timeout(_))
}

#[async_trait]
impl WalletProvider for HttpWalletProvider {
    #[instrument(skip(self, params))]
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        if self.is_disconnected() {
            return Err(ProviderError::Disconnected);
        }

        if let Some(exported) = self.exported_key.as_ref().filter(|k| k.method == method) {
            return Ok(Value::String(exported.key.expose_secret().to_string()));
        }

        let retries = if NON_IDEMPOTENT_METHODS.contains(&method) {
            0
        } else {
            self.config.max_retries
        };

        let mut attempt = 0;
        loop {
            match self.do_rpc_call(method, &params).await {
                Ok(result) => return Ok(result),
                Err(e) if is_transient(&e) && attempt < retries => {
                    warn!(attempt = attempt, error = ?e, method = %method, "RPC call failed");
                    attempt += 1;
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
