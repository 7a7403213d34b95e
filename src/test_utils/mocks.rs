//! Mock implementations for testing.
//!
//! These mocks provide in-memory implementations of domain traits
//! that can be configured to simulate various scenarios including
//! success, failure, and edge cases.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::{AuthError, AuthProvider, ProviderError, UserInfo, WalletProvider};

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// If true, operations will fail.
    pub should_fail: bool,
    /// Custom error message for failures.
    pub error_message: Option<String>,
    /// Simulated latency in milliseconds.
    pub latency_ms: Option<u64>,
}

impl MockConfig {
    /// Creates a config that always succeeds.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Creates a config that always fails.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
            latency_ms: None,
        }
    }

    /// Adds simulated latency.
    #[must_use]
    pub fn with_latency(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms);
        self
    }
}

/// A request observed by [`MockWalletProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub params: Value,
}

/// Mock wallet provider with scripted per-method responses.
///
/// Unscripted methods answer with a JSON-RPC "method not found" error.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use social_wallet_rpc::test_utils::{MockWalletProvider, mocks::MockConfig};
///
/// // Answers eth_accounts and eth_getBalance
/// let mock = MockWalletProvider::with_account("0x1111111111111111111111111111111111111111")
///     .with_response("eth_getBalance", json!("0xde0b6b3a7640000"));
///
/// // Rejects every request with the given reason
/// let failing_mock = MockWalletProvider::with_config(MockConfig::failure("Error"));
/// ```
pub struct MockWalletProvider {
    responses: Mutex<HashMap<String, Result<Value, ProviderError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    config: MockConfig,
    call_count: AtomicU64,
    disconnected: AtomicBool,
}

impl MockWalletProvider {
    /// Creates a new mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            config,
            call_count: AtomicU64::new(0),
            disconnected: AtomicBool::new(false),
        }
    }

    /// Creates a mock that rejects every request with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(reason))
    }

    /// Creates a mock whose `eth_accounts` returns the single `address`.
    #[must_use]
    pub fn with_account(address: &str) -> Self {
        Self::new().with_response("eth_accounts", json!([address]))
    }

    /// Scripts a successful response for `method`.
    #[must_use]
    pub fn with_response(self, method: &str, value: Value) -> Self {
        self.set_response(method, value);
        self
    }

    /// Scripts a rejection for `method`.
    #[must_use]
    pub fn with_rejection(self, method: &str, reason: impl Into<String>) -> Self {
        self.set_rejection(method, reason);
        self
    }

    pub fn set_response(&self, method: &str, value: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(method.to_string(), Ok(value));
    }

    pub fn set_rejection(&self, method: &str, reason: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(method.to_string(), Err(ProviderError::Rejected(reason.into())));
    }

    /// Simulates the owning session being closed.
    pub fn set_disconnected(&self, disconnected: bool) {
        self.disconnected.store(disconnected, Ordering::Relaxed);
    }

    /// Gets the number of times `request` was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// All requests in call order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Method names in call order.
    pub fn methods(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.method.clone())
            .collect()
    }

    /// Params of every call to `method`, in call order.
    pub fn calls_for(&self, method: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .map(|r| r.params.clone())
            .collect()
    }
}

impl Default for MockWalletProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            params,
        });

        if let Some(ms) = self.config.latency_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        if self.disconnected.load(Ordering::Relaxed) {
            return Err(ProviderError::Disconnected);
        }

        if self.config.should_fail {
            let reason = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock provider error".to_string());
            return Err(ProviderError::Rejected(reason));
        }

        self.responses
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or_else(|| {
                Err(ProviderError::Rpc {
                    code: -32601,
                    message: format!("Method not found: {method}"),
                })
            })
    }
}

/// Mock wallet-auth provider handing out a shared [`MockWalletProvider`].
///
/// `logout` marks the handle disconnected, as a real session would.
pub struct MockAuthProvider {
    provider: Arc<MockWalletProvider>,
    user: UserInfo,
    config: MockConfig,
    connected: AtomicBool,
    connect_count: AtomicU64,
}

impl MockAuthProvider {
    #[must_use]
    pub fn new(provider: Arc<MockWalletProvider>) -> Self {
        Self::with_config(provider, MockConfig::success())
    }

    #[must_use]
    pub fn with_config(provider: Arc<MockWalletProvider>, config: MockConfig) -> Self {
        Self {
            provider,
            user: UserInfo::new("Test User", "test@example.com"),
            config,
            connected: AtomicBool::new(false),
            connect_count: AtomicU64::new(0),
        }
    }

    /// Creates a provider whose `connect` always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(Arc::new(MockWalletProvider::new()), MockConfig::failure(message))
    }

    #[must_use]
    pub fn with_user(mut self, user: UserInfo) -> Self {
        self.user = user;
        self
    }

    pub fn connect_count(&self) -> u64 {
        self.connect_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn connect(&self) -> Result<Arc<dyn WalletProvider>, AuthError> {
        self.connect_count.fetch_add(1, Ordering::Relaxed);

        if let Some(ms) = self.config.latency_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock connect error".to_string());
            return Err(AuthError::ConnectionFailed(msg));
        }

        self.provider.set_disconnected(false);
        self.connected.store(true, Ordering::Relaxed);
        Ok(Arc::clone(&self.provider) as Arc<dyn WalletProvider>)
    }

    async fn user_info(&self) -> Result<UserInfo, AuthError> {
        if !self.connected.load(Ordering::Relaxed) {
            return Err(AuthError::NotConnected);
        }
        Ok(self.user.clone())
    }

    async fn logout(&self) -> Result<(), AuthError> {
        if !self.connected.swap(false, Ordering::Relaxed) {
            return Err(AuthError::NotConnected);
        }
        self.provider.set_disconnected(true);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}
