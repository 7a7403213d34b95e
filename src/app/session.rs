//! Login session holding the user's profile and RPC client.
//!
//! At most one session is active. Logging in connects through the
//! [`AuthProvider`], reads the profile and binds an [`RpcClient`] to the
//! returned provider handle. Logging out closes the handle, so clients still
//! held by in-flight requests fail fast.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::rpc::{RpcClient, RpcSettings};
use crate::domain::{AppError, AuthProvider, HealthResponse, HealthStatus, SessionResponse, UserInfo};

struct Session {
    id: Uuid,
    user: UserInfo,
    rpc: Arc<RpcClient>,
    connected_at: DateTime<Utc>,
}

impl Session {
    fn snapshot(&self) -> SessionResponse {
        SessionResponse {
            logged_in: true,
            session_id: Some(self.id),
            user: Some(self.user.clone()),
            connected_at: Some(self.connected_at),
        }
    }
}

pub struct SessionManager {
    auth: Arc<dyn AuthProvider>,
    settings: RpcSettings,
    session: RwLock<Option<Session>>,
    /// Serializes logins so only one `connect` is in flight.
    login_lock: Mutex<()>,
}

impl SessionManager {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthProvider>, settings: RpcSettings) -> Self {
        Self {
            auth,
            settings,
            session: RwLock::new(None),
            login_lock: Mutex::new(()),
        }
    }

    /// Opens a session, or returns the current one if already logged in.
    #[instrument(skip(self))]
    pub async fn login(&self) -> Result<SessionResponse, AppError> {
        let _login = self.login_lock.lock().await;
        if let Some(session) = self.session.read().await.as_ref() {
            return Ok(session.snapshot());
        }

        // The session lock is not held here, so reads proceed while connecting

        let provider = self.auth.connect().await?;
        let user = match self.auth.user_info().await {
            Ok(user) => user,
            Err(e) => {
                if let Err(logout_err) = self.auth.logout().await {
                    warn!(error = %logout_err, "Failed to close half-open session");
                }
                return Err(e.into());
            }
        };

        let session = Session {
            id: Uuid::new_v4(),
            user,
            rpc: Arc::new(RpcClient::new(provider, self.settings.clone())),
            connected_at: Utc::now(),
        };
        info!(session_id = %session.id, "User logged in");

        let snapshot = session.snapshot();
        *self.session.write().await = Some(session);
        Ok(snapshot)
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AppError> {
        let session = self.session.write().await.take().ok_or(AppError::NotLoggedIn)?;
        self.auth.logout().await?;
        info!(session_id = %session.id, "User logged out");
        Ok(())
    }

    /// The client bound to the current session.
    pub async fn rpc(&self) -> Result<Arc<RpcClient>, AppError> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| Arc::clone(&s.rpc))
            .ok_or(AppError::NotLoggedIn)
    }

    /// Profile of the logged-in user, as currently reported by the provider.
    pub async fn user_info(&self) -> Result<UserInfo, AppError> {
        if !self.is_logged_in().await {
            return Err(AppError::NotLoggedIn);
        }
        Ok(self.auth.user_info().await?)
    }

    pub async fn is_logged_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    pub async fn snapshot(&self) -> SessionResponse {
        self.session
            .read()
            .await
            .as_ref()
            .map_or_else(SessionResponse::logged_out, Session::snapshot)
    }

    /// Probes the provider with `eth_chainId` when a session is open.
    pub async fn health(&self) -> HealthResponse {
        let rpc = match self.rpc().await {
            Ok(rpc) => rpc,
            Err(_) => return HealthResponse::new(false, HealthStatus::Degraded),
        };

        let provider = match rpc.get_chain_id().await {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = %e, "Provider health check failed");
                HealthStatus::Unhealthy
            }
        };
        HealthResponse::new(true, provider)
    }
}
