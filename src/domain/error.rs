//! Application error types with proper error chaining.

use thiserror::Error;

use super::abi::AbiError;
use super::units::UnitsError;

/// Failures raised by a wallet provider handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Provider session has been closed")]
    Disconnected,
    /// A rejection whose reason is passed through untouched.
    #[error("{0}")]
    Rejected(String),
}

/// Failure of a single `RpcClient` operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("No account available on the connected provider")]
    NoAccounts,
    #[error("Unexpected response to {method}: {message}")]
    Decode { method: String, message: String },
    #[error("Transaction {hash} not confirmed within {timeout_secs}s")]
    ReceiptTimeout { hash: String, timeout_secs: u64 },
    #[error("Transaction {0} reverted")]
    Reverted(String),
    #[error(transparent)]
    Units(#[from] UnitsError),
    #[error(transparent)]
    Abi(#[from] AbiError),
}

impl RpcError {
    pub(crate) fn decode(method: &str, message: impl Into<String>) -> Self {
        RpcError::Decode {
            method: method.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Wallet connection failed: {0}")]
    ConnectionFailed(String),
    #[error("No wallet connected")]
    NotConnected,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Authentication failed: {0}")]
    Authentication(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::InvalidResponse(err.to_string())
    }
}
