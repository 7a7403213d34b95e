//! Domain traits defining contracts for external systems.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::error::{AuthError, ProviderError};
use super::types::UserInfo;

/// Authenticated connection to the user's wallet.
///
/// Mirrors the EIP-1193 `request({ method, params })` shape: every chain
/// operation, including provider-local ones such as key export, is a
/// method name plus JSON parameters.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Issue a single request and return the raw JSON result.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;
}

/// Wallet-auth provider that owns the provider handle's lifecycle.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Authenticate and return a connected provider handle.
    async fn connect(&self) -> Result<Arc<dyn WalletProvider>, AuthError>;

    /// Profile fields of the authenticated user.
    async fn user_info(&self) -> Result<UserInfo, AuthError>;

    /// End the session. Handles returned by `connect` stop working.
    async fn logout(&self) -> Result<(), AuthError>;

    /// Whether a session is currently open.
    fn is_connected(&self) -> bool;
}
