//! Environment-driven configuration.
//!
//! Every setting has a default except `API_AUTH_KEY`. Empty values count as
//! unset. Parsing goes through a lookup function so tests never touch the
//! process environment.

use alloy_primitives::{Address, U256};
use secrecy::SecretString;
use std::fmt::Display;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use std::time::Duration;

use crate::app::{ContractSettings, RpcSettings};
use crate::domain::{ConfigError, UserInfo, parse_units};
use crate::infra::{HttpProviderConfig, LogFormat, NodeAuthConfig};

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 3000));
const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub api_auth_key: SecretString,
    pub log_format: LogFormat,
    pub node: NodeAuthConfig,
    pub rpc: RpcSettings,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let api_auth_key = env
            .string("API_AUTH_KEY")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("API_AUTH_KEY".to_string()))?;

        let bind_addr = env
            .parse::<SocketAddr>("BIND_ADDR")?
            .unwrap_or(DEFAULT_BIND_ADDR);
        let log_format = env.parse::<LogFormat>("LOG_FORMAT")?.unwrap_or_default();

        let defaults = RpcSettings::default();
        let decimals = env.parse::<u8>("TOKEN_DECIMALS")?.unwrap_or(defaults.decimals);
        let transfer_value = match env.string("TRANSFER_AMOUNT") {
            Some(amount) => {
                parse_units(&amount, decimals).map_err(|e| invalid("TRANSFER_AMOUNT", e))?
            }
            None => defaults.transfer_value,
        };
        let private_key_method = env
            .string("PRIVATE_KEY_METHOD")
            .unwrap_or(defaults.private_key_method);

        let rpc = RpcSettings {
            recipient: env
                .parse::<Address>("TRANSFER_RECIPIENT")?
                .unwrap_or(defaults.recipient),
            transfer_value,
            max_priority_fee_per_gas: env
                .parse::<U256>("MAX_PRIORITY_FEE_PER_GAS")?
                .unwrap_or(defaults.max_priority_fee_per_gas),
            max_fee_per_gas: env
                .parse::<U256>("MAX_FEE_PER_GAS")?
                .unwrap_or(defaults.max_fee_per_gas),
            contract: ContractSettings {
                address: env
                    .parse::<Address>("CONTRACT_ADDRESS")?
                    .unwrap_or(defaults.contract.address),
                message: env
                    .string("CONTRACT_MESSAGE")
                    .unwrap_or(defaults.contract.message),
                ..defaults.contract
            },
            decimals,
            private_key_method: private_key_method.clone(),
            receipt_poll_interval: env
                .parse::<u64>("RECEIPT_POLL_INTERVAL_MS")?
                .map_or(defaults.receipt_poll_interval, Duration::from_millis),
            receipt_timeout: env
                .parse::<u64>("RECEIPT_TIMEOUT_SECS")?
                .map_or(defaults.receipt_timeout, Duration::from_secs),
        };

        let provider_defaults = HttpProviderConfig::default();
        let node = NodeAuthConfig {
            rpc_url: env
                .string("ETH_RPC_URL")
                .unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            provider: HttpProviderConfig {
                timeout: env
                    .parse::<u64>("RPC_TIMEOUT_SECS")?
                    .map_or(provider_defaults.timeout, Duration::from_secs),
                max_retries: env
                    .parse::<u32>("RPC_MAX_RETRIES")?
                    .unwrap_or(provider_defaults.max_retries),
                ..provider_defaults
            },
            user: UserInfo {
                name: env.string("USER_NAME"),
                email: env.string("USER_EMAIL"),
            },
            exported_key: env.string("WALLET_PRIVATE_KEY").map(SecretString::from),
            private_key_method,
        };

        Ok(Self {
            bind_addr,
            api_auth_key,
            log_format,
            node,
            rpc,
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.string(key)
            .map(|v| v.parse().map_err(|e| invalid(key, e)))
            .transpose()
    }
}

fn invalid(key: &str, err: impl Display) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: err.to_string(),
    }
}
