//! Domain layer containing core types, traits, and error definitions.

pub mod abi;
pub mod error;
pub mod traits;
pub mod types;
pub mod units;

pub use abi::AbiError;
pub use error::{AppError, AuthError, ConfigError, ProviderError, RpcError};
pub use traits::{AuthProvider, WalletProvider};
pub use types::{
    AccountResponse, BalanceResponse, ChainId, ChainIdResponse, ContractMessageResponse,
    ErrorDetail, ErrorResponse, HealthResponse, HealthStatus, PrivateKeyResponse,
    SessionResponse, SignMessageRequest, SignatureResponse, TransactionReceipt,
    TransactionRequest, UserInfo, parse_quantity, to_quantity,
};
pub use units::{ETHER_DECIMALS, UnitsError, format_units, parse_units};
