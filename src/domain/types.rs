use alloy_primitives::{Address, B256, Bytes, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use uuid::Uuid;

/// Network identifier reported by `eth_chainId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Parses a JSON-RPC quantity (`"0x1a"`); decimal strings are accepted too.
pub fn parse_quantity(raw: &str) -> Result<U256, String> {
    let trimmed = raw.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some("") => return Err(format!("empty hex quantity {raw:?}")),
        Some(digits) => U256::from_str_radix(digits, 16),
        None => U256::from_str_radix(trimmed, 10),
    };
    parsed.map_err(|e| format!("invalid quantity {raw:?}: {e}"))
}

/// Formats a value as a JSON-RPC quantity.
#[must_use]
pub fn to_quantity(value: U256) -> String {
    format!("0x{value:x}")
}

mod quantity {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<U256>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_some(&super::to_quantity(*v)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<U256>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| super::parse_quantity(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Transaction submitted through `eth_sendTransaction`.
///
/// The provider fills in nonce, gas limit and signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub value: Option<U256>,
    pub data: Option<Bytes>,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
}

impl TransactionRequest {
    /// The JSON object passed as the single `eth_sendTransaction` parameter.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut tx = json!({
            "from": self.from.to_string(),
            "to": self.to.to_string(),
            "maxPriorityFeePerGas": to_quantity(self.max_priority_fee_per_gas),
            "maxFeePerGas": to_quantity(self.max_fee_per_gas),
        });
        if let Some(value) = self.value {
            tx["value"] = Value::String(to_quantity(value));
        }
        if let Some(data) = &self.data {
            tx["data"] = Value::String(format!("0x{}", hex::encode(data)));
        }
        tx
    }
}

/// Receipt of a mined transaction, as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default, with = "quantity")]
    pub block_number: Option<U256>,
    #[serde(default)]
    pub from: Option<Address>,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default, with = "quantity")]
    pub gas_used: Option<U256>,
    #[serde(default, with = "quantity")]
    pub status: Option<U256>,
}

impl TransactionReceipt {
    #[must_use]
    pub fn new(transaction_hash: B256) -> Self {
        Self {
            transaction_hash,
            block_hash: None,
            block_number: None,
            from: None,
            to: None,
            gas_used: None,
            status: None,
        }
    }

    /// Pre-Byzantium receipts carry no status; those count as success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_none_or(|s| s == U256::from(1u8))
    }
}

/// Profile fields reported by the wallet-auth provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserInfo {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }
}

/// Snapshot of the current session as exposed over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub logged_in: bool,
    pub session_id: Option<Uuid>,
    pub user: Option<UserInfo>,
    pub connected_at: Option<DateTime<Utc>>,
}

impl SessionResponse {
    #[must_use]
    pub fn logged_out() -> Self {
        Self {
            logged_in: false,
            session_id: None,
            user: None,
            connected_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainIdResponse {
    pub chain_id: ChainId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractMessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignMessageRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureResponse {
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateKeyResponse {
    pub private_key: String,
}

/// Health check status for services.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check response for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub provider: HealthStatus,
    pub logged_in: bool,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    /// Without a session the service still serves login, so it is degraded
    /// rather than unhealthy.
    pub fn new(logged_in: bool, provider: HealthStatus) -> Self {
        let status = match (logged_in, provider) {
            (false, _) => HealthStatus::Degraded,
            (true, provider) => provider,
        };

        Self {
            status,
            provider,
            logged_in,
            timestamp: Utc::now(),
        }
    }
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub r#type: String,
    pub message: String,
}
