//! Social Wallet RPC
//!
//! Typed Ethereum wallet operations over a provider handle obtained from a
//! wallet-auth login, exposed as a library and as a small HTTP service.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │   axum routes, API-key guard, error bodies   │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │     RpcClient operations, login session      │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │  Provider traits, types, units, ABI, errors  │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │  JSON-RPC HTTP provider, node auth, logging  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every `RpcClient` operation returns `Result<T, RpcError>`. A rejection
//! from the provider is never turned into a value; its reason is kept
//! verbatim on the error side.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use social_wallet_rpc::app::{RpcClient, RpcSettings};
//! use social_wallet_rpc::domain::AuthProvider;
//! use social_wallet_rpc::infra::{NodeAuthConfig, NodeAuthProvider};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let auth = NodeAuthProvider::new(NodeAuthConfig::new("http://127.0.0.1:8545"));
//!     let provider = auth.connect().await?;
//!
//!     let rpc = RpcClient::new(provider, RpcSettings::default());
//!     println!("balance: {}", rpc.get_balance().await?);
//!
//!     auth.logout().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod infra;

// Test utilities are available in tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
