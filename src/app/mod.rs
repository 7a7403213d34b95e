//! Application layer: wallet operations, session lifecycle and shared state.

pub mod rpc;
pub mod session;
pub mod state;

pub use rpc::{ContractSettings, RpcClient, RpcSettings};
pub use session::SessionManager;
pub use state::AppState;
