//! Wallet provider implementations.

mod http;

pub use http::{HttpProviderConfig, HttpWalletProvider};
