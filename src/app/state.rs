//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers via Axum's State extractor.

use secrecy::SecretString;
use std::sync::Arc;

use super::session::SessionManager;
use crate::infra::PrometheusHandle;

/// Shared application state for the Axum web server.
///
/// Handlers reach the wallet only through the session manager, so they never
/// see the concrete auth or provider implementations.
///
/// # Example
///
/// ```ignore
/// let auth = Arc::new(NodeAuthProvider::new(config.node));
/// let session = Arc::new(SessionManager::new(auth, config.rpc));
/// let state = Arc::new(AppState::new(session, config.api_auth_key));
///
/// let router = create_router(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionManager>,

    /// Key expected in the `x-api-key` header of mutating requests.
    pub api_auth_key: SecretString,

    /// Prometheus handle for GET /metrics; `None` when metrics are disabled.
    pub metrics: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    #[must_use]
    pub fn new(session: Arc<SessionManager>, api_auth_key: SecretString) -> Self {
        Self {
            session,
            api_auth_key,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, handle: Option<Arc<PrometheusHandle>>) -> Self {
        self.metrics = handle;
        self
    }
}
