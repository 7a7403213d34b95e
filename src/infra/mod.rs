//! Infrastructure layer implementations.

pub mod auth;
pub mod observability;
pub mod provider;

pub use auth::{NodeAuthConfig, NodeAuthProvider};
pub use observability::{LogFormat, PrometheusHandle, init_metrics, init_metrics_handle, init_tracing};
pub use provider::{HttpProviderConfig, HttpWalletProvider};
