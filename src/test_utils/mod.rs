//! Test utilities and mock implementations.
//!
//! This module provides reusable mock implementations of domain traits
//! for use in unit and integration tests.

pub mod mocks;
pub mod rpc_stub;

pub use mocks::{MockAuthProvider, MockConfig, MockWalletProvider, RecordedRequest};
pub use rpc_stub::JsonRpcStub;
