//! Session-scoped Ethereum operations over a wallet provider handle.
//!
//! `RpcClient` shapes arguments, converts units and decodes results. Every
//! operation resolves to a `Result`: failures from any underlying call are
//! returned on the `Err` side with the provider's reason intact, logged,
//! and counted. Nothing is retried here; transport retries belong to the
//! provider implementation.

use alloy_primitives::{Address, B256, Bytes, U256, address};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    ChainId, RpcError, TransactionReceipt, TransactionRequest, WalletProvider, abi,
    parse_quantity, units,
};
use crate::infra::observability::OPERATIONS_TOTAL;

/// Contract used by the contract read/write operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSettings {
    pub address: Address,
    /// Canonical signature of the setter, taking one `string`.
    pub setter: String,
    /// Canonical signature of the zero-argument `string` getter.
    pub getter: String,
    /// Value written by `send_contract_transaction`.
    pub message: String,
}

impl Default for ContractSettings {
    fn default() -> Self {
        Self {
            address: address!("0x04cA407965D60C2B39d892a1DFB1d1d9C30d0334"),
            setter: "update(string)".to_string(),
            getter: "message()".to_string(),
            message: "Hello from the wallet session".to_string(),
        }
    }
}

/// Parameters of the write operations and unit conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcSettings {
    pub recipient: Address,
    /// Transfer value in base units.
    pub transfer_value: U256,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
    pub contract: ContractSettings,
    /// Decimals of the native token; 18 on Ethereum and most EVM chains.
    pub decimals: u8,
    /// Provider method that exports the session's private key.
    pub private_key_method: String,
    pub receipt_poll_interval: Duration,
    pub receipt_timeout: Duration,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            recipient: address!("0x5FD22e75d105DD4640eE5c9b862722010B7F273A"),
            // 0.001 ether
            transfer_value: U256::from(1_000_000_000_000_000u64),
            max_priority_fee_per_gas: U256::from(5_000_000_000u64),
            max_fee_per_gas: U256::from(6_000_000_000_000u64),
            contract: ContractSettings::default(),
            decimals: units::ETHER_DECIMALS,
            private_key_method: "eth_private_key".to_string(),
            receipt_poll_interval: Duration::from_secs(1),
            receipt_timeout: Duration::from_secs(750),
        }
    }
}

/// Ethereum operations bound to one connected provider handle.
///
/// The handle is shared with the auth provider that created it. The client
/// never connects or disconnects it; once the session ends, calls fail with
/// the provider's own error.
pub struct RpcClient {
    provider: Arc<dyn WalletProvider>,
    settings: RpcSettings,
}

impl RpcClient {
    #[must_use]
    pub fn new(provider: Arc<dyn WalletProvider>, settings: RpcSettings) -> Self {
        Self { provider, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &RpcSettings {
        &self.settings
    }

    /// Network identifier reported by the provider.
    #[instrument(skip(self))]
    pub async fn get_chain_id(&self) -> Result<ChainId, RpcError> {
        self.observe("get_chain_id", async {
            let raw = self.quantity("eth_chainId", json!([])).await?;
            let id = u64::try_from(raw)
                .map_err(|_| RpcError::decode("eth_chainId", format!("chain id {raw} exceeds u64")))?;
            Ok::<_, RpcError>(ChainId(id))
        })
        .await
    }

    /// First account exposed by the provider.
    #[instrument(skip(self))]
    pub async fn get_accounts(&self) -> Result<Address, RpcError> {
        self.observe("get_accounts", self.first_account()).await
    }

    /// Balance of the first account in human-readable units.
    #[instrument(skip(self))]
    pub async fn get_balance(&self) -> Result<String, RpcError> {
        self.observe("get_balance", async {
            let account = self.first_account().await?;
            let raw = self
                .quantity("eth_getBalance", json!([account, "latest"]))
                .await?;
            debug!(%account, wei = %raw, "Fetched balance");
            Ok::<_, RpcError>(units::format_units(raw, self.settings.decimals)?)
        })
        .await
    }

    /// Sends the configured native transfer and waits for its receipt.
    #[instrument(skip(self))]
    pub async fn send_transaction(&self) -> Result<TransactionReceipt, RpcError> {
        self.observe("send_transaction", async {
            let from = self.first_account().await?;
            let tx = TransactionRequest {
                from,
                to: self.settings.recipient,
                value: Some(self.settings.transfer_value),
                data: None,
                max_priority_fee_per_gas: self.settings.max_priority_fee_per_gas,
                max_fee_per_gas: self.settings.max_fee_per_gas,
            };
            self.submit(tx).await
        })
        .await
    }

    /// Calls the configured contract setter and waits for its receipt.
    #[instrument(skip(self))]
    pub async fn send_contract_transaction(&self) -> Result<TransactionReceipt, RpcError> {
        self.observe("send_contract_transaction", async {
            let from = self.first_account().await?;
            let contract = &self.settings.contract;
            let data = abi::encode_string_call(&contract.setter, &contract.message);
            let tx = TransactionRequest {
                from,
                to: contract.address,
                value: None,
                data: Some(Bytes::from(data)),
                max_priority_fee_per_gas: self.settings.max_priority_fee_per_gas,
                max_fee_per_gas: self.settings.max_fee_per_gas,
            };
            self.submit(tx).await
        })
        .await
    }

    /// Reads the configured contract getter.
    #[instrument(skip(self))]
    pub async fn read_contract(&self) -> Result<String, RpcError> {
        self.observe("read_contract", async {
            let contract = &self.settings.contract;
            let data = abi::encode_call(&contract.getter);
            let call = json!({
                "to": contract.address,
                "data": format!("0x{}", hex::encode(data)),
            });
            let raw: String = self.call("eth_call", json!([call, "latest"])).await?;
            let bytes = hex::decode(raw.trim_start_matches("0x"))
                .map_err(|e| RpcError::decode("eth_call", e.to_string()))?;
            Ok::<_, RpcError>(abi::decode_string(&bytes)?)
        })
        .await
    }

    /// Signs `message` with the first account via `personal_sign`.
    #[instrument(skip(self, message))]
    pub async fn sign_message(&self, message: &str) -> Result<String, RpcError> {
        self.observe("sign_message", async {
            let from = self.first_account().await?;
            let payload = format!("0x{}", hex::encode(message.as_bytes()));
            let signature: String = self.call("personal_sign", json!([payload, from])).await?;
            Ok::<_, RpcError>(signature)
        })
        .await
    }

    /// Exports the session key through the provider's key-export method.
    #[instrument(skip(self))]
    pub async fn get_private_key(&self) -> Result<SecretString, RpcError> {
        self.observe("get_private_key", async {
            let key: String = self
                .call(&self.settings.private_key_method, json!([]))
                .await?;
            Ok::<_, RpcError>(SecretString::from(key))
        })
        .await
    }

    async fn observe<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, RpcError>>,
    ) -> Result<T, RpcError> {
        let result = fut.await;
        let outcome = match &result {
            Ok(_) => {
                debug!(operation, "RPC operation succeeded");
                "success"
            }
            Err(e) => {
                warn!(operation, error = %e, "RPC operation failed");
                "failure"
            }
        };
        metrics::counter!(
            OPERATIONS_TOTAL,
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);
        result
    }

    async fn call<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, RpcError> {
        let value = self.provider.request(method, params).await?;
        serde_json::from_value(value).map_err(|e| RpcError::decode(method, e.to_string()))
    }

    async fn quantity(&self, method: &str, params: Value) -> Result<U256, RpcError> {
        let raw: String = self.call(method, params).await?;
        parse_quantity(&raw).map_err(|e| RpcError::decode(method, e))
    }

    async fn first_account(&self) -> Result<Address, RpcError> {
        let accounts: Vec<Address> = self.call("eth_accounts", json!([])).await?;
        accounts.into_iter().next().ok_or(RpcError::NoAccounts)
    }

    async fn submit(&self, tx: TransactionRequest) -> Result<TransactionReceipt, RpcError> {
        let hash: B256 = self
            .call("eth_sendTransaction", json!([tx.to_json()]))
            .await?;
        info!(%hash, to = %tx.to, "Transaction submitted");
        self.wait_for_receipt(hash).await
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt, RpcError> {
        let deadline = tokio::time::Instant::now() + self.settings.receipt_timeout;

        loop {
            let receipt: Option<TransactionReceipt> = self
                .call("eth_getTransactionReceipt", json!([hash]))
                .await?;

            if let Some(receipt) = receipt {
                if !receipt.is_success() {
                    return Err(RpcError::Reverted(hash.to_string()));
                }
                info!(%hash, block = ?receipt.block_number, "Transaction confirmed");
                return Ok(receipt);
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(RpcError::ReceiptTimeout {
                    hash: hash.to_string(),
                    timeout_secs: self.settings.receipt_timeout.as_secs(),
                });
            }
            debug!(%hash, "Receipt not yet available");
            tokio::time::sleep(self.settings.receipt_poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProviderError;
    use crate::test_utils::MockWalletProvider;
    use secrecy::ExposeSecret;

    const ACCOUNT: &str = "0x1111111111111111111111111111111111111111";

    fn tx_hash() -> String {
        format!("0x{}", "ab".repeat(32))
    }

    fn client(provider: Arc<MockWalletProvider>) -> RpcClient {
        let settings = RpcSettings {
            receipt_poll_interval: Duration::from_millis(10),
            receipt_timeout: Duration::from_millis(50),
            ..RpcSettings::default()
        };
        RpcClient::new(provider, settings)
    }

    #[test]
    fn test_default_settings_match_demo_constants() {
        let settings = RpcSettings::default();
        assert_eq!(
            settings.recipient.to_string(),
            "0x5FD22e75d105DD4640eE5c9b862722010B7F273A"
        );
        assert_eq!(
            settings.transfer_value,
            units::parse_units("0.001", 18).unwrap()
        );
        assert_eq!(settings.max_priority_fee_per_gas, U256::from(5_000_000_000u64));
        assert_eq!(settings.max_fee_per_gas, U256::from(6_000_000_000_000u64));
        assert_eq!(settings.decimals, 18);
        assert_eq!(settings.private_key_method, "eth_private_key");
    }

    #[tokio::test]
    async fn test_chain_id_decodes_hex() {
        let provider = Arc::new(MockWalletProvider::new().with_response("eth_chainId", json!("0xaa36a7")));
        let rpc = client(provider);

        assert_eq!(rpc.get_chain_id().await.unwrap(), ChainId(11_155_111));
    }

    #[tokio::test]
    async fn test_chain_id_malformed_response() {
        let provider = Arc::new(MockWalletProvider::new().with_response("eth_chainId", json!(42)));
        let rpc = client(provider);

        let err = rpc.get_chain_id().await.unwrap_err();
        assert!(matches!(err, RpcError::Decode { ref method, .. } if method == "eth_chainId"));
    }

    #[tokio::test]
    async fn test_accounts_empty_list() {
        let provider = Arc::new(MockWalletProvider::new().with_response("eth_accounts", json!([])));
        let rpc = client(provider);

        assert_eq!(rpc.get_accounts().await.unwrap_err(), RpcError::NoAccounts);
    }

    #[tokio::test]
    async fn test_balance_uses_configured_decimals() {
        let provider = Arc::new(
            MockWalletProvider::with_account(ACCOUNT)
                .with_response("eth_getBalance", json!("0x1e8480")),
        );
        let settings = RpcSettings {
            decimals: 6,
            ..RpcSettings::default()
        };
        let rpc = RpcClient::new(provider, settings);

        assert_eq!(rpc.get_balance().await.unwrap(), "2");
    }

    #[tokio::test]
    async fn test_receipt_polled_until_available() {
        let provider = Arc::new(
            MockWalletProvider::with_account(ACCOUNT)
                .with_response("eth_sendTransaction", json!(tx_hash()))
                .with_response("eth_getTransactionReceipt", Value::Null),
        );
        let rpc = client(Arc::clone(&provider));

        let pending = tokio::spawn(async move { rpc.send_transaction().await });
        tokio::time::sleep(Duration::from_millis(15)).await;
        provider.set_response(
            "eth_getTransactionReceipt",
            json!({ "transactionHash": tx_hash(), "status": "0x1" }),
        );

        let receipt = pending.await.unwrap().unwrap();
        assert_eq!(receipt.transaction_hash.to_string(), tx_hash());
        assert!(provider.calls_for("eth_getTransactionReceipt").len() >= 2);
    }

    #[tokio::test]
    async fn test_receipt_timeout() {
        let provider = Arc::new(
            MockWalletProvider::with_account(ACCOUNT)
                .with_response("eth_sendTransaction", json!(tx_hash()))
                .with_response("eth_getTransactionReceipt", Value::Null),
        );
        let rpc = client(provider);

        let err = rpc.send_transaction().await.unwrap_err();
        assert!(matches!(err, RpcError::ReceiptTimeout { ref hash, .. } if *hash == tx_hash()));
    }

    #[tokio::test]
    async fn test_reverted_transaction_is_an_error() {
        let provider = Arc::new(
            MockWalletProvider::with_account(ACCOUNT)
                .with_response("eth_sendTransaction", json!(tx_hash()))
                .with_response(
                    "eth_getTransactionReceipt",
                    json!({ "transactionHash": tx_hash(), "status": "0x0" }),
                ),
        );
        let rpc = client(provider);

        assert_eq!(
            rpc.send_transaction().await.unwrap_err(),
            RpcError::Reverted(tx_hash())
        );
    }

    #[tokio::test]
    async fn test_contract_transaction_encodes_setter_call() {
        let provider = Arc::new(
            MockWalletProvider::with_account(ACCOUNT)
                .with_response("eth_sendTransaction", json!(tx_hash()))
                .with_response(
                    "eth_getTransactionReceipt",
                    json!({ "transactionHash": tx_hash() }),
                ),
        );
        let rpc = client(Arc::clone(&provider));

        rpc.send_contract_transaction().await.unwrap();

        let params = provider.calls_for("eth_sendTransaction");
        let tx = &params[0][0];
        assert_eq!(tx["to"], "0x04cA407965D60C2B39d892a1DFB1d1d9C30d0334");
        assert_eq!(tx["from"], ACCOUNT);
        assert!(tx.get("value").is_none());

        let data = tx["data"].as_str().unwrap();
        assert!(data.starts_with("0x3d7403a3"));
        let decoded = abi::decode_string(&hex::decode(&data[10..]).unwrap()).unwrap();
        assert_eq!(decoded, "Hello from the wallet session");
    }

    #[tokio::test]
    async fn test_read_contract_decodes_string() {
        let encoded = abi::encode_string_call("update(string)", "stored message");
        let provider = Arc::new(MockWalletProvider::new().with_response(
            "eth_call",
            json!(format!("0x{}", hex::encode(&encoded[4..]))),
        ));
        let rpc = client(Arc::clone(&provider));

        assert_eq!(rpc.read_contract().await.unwrap(), "stored message");

        let params = provider.calls_for("eth_call");
        assert_eq!(params[0][0]["data"], "0xe21f37ce");
        assert_eq!(params[0][1], "latest");
    }

    #[tokio::test]
    async fn test_sign_message_hex_encodes_payload() {
        let provider = Arc::new(
            MockWalletProvider::with_account(ACCOUNT)
                .with_response("personal_sign", json!("0xsignature")),
        );
        let rpc = client(Arc::clone(&provider));

        assert_eq!(rpc.sign_message("hi").await.unwrap(), "0xsignature");
        let params = provider.calls_for("personal_sign");
        assert_eq!(params[0], json!(["0x6869", ACCOUNT]));
    }

    #[tokio::test]
    async fn test_private_key_uses_configured_method() {
        let provider = Arc::new(
            MockWalletProvider::new().with_response("wallet_exportKey", json!("0xkey")),
        );
        let settings = RpcSettings {
            private_key_method: "wallet_exportKey".to_string(),
            ..RpcSettings::default()
        };
        let rpc = RpcClient::new(provider, settings);

        assert_eq!(rpc.get_private_key().await.unwrap().expose_secret(), "0xkey");
    }

    #[tokio::test]
    async fn test_disconnected_provider_surfaces_as_error() {
        let provider = Arc::new(MockWalletProvider::with_account(ACCOUNT));
        provider.set_disconnected(true);
        let rpc = client(provider);

        assert_eq!(
            rpc.get_accounts().await.unwrap_err(),
            RpcError::Provider(ProviderError::Disconnected)
        );
    }
}
