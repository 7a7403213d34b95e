//! Wallet session backed by a JSON-RPC node.
//!
//! `connect` opens a fresh [`HttpWalletProvider`] and verifies the node
//! answers `eth_chainId`. `logout` invalidates that handle, so clones held
//! elsewhere stop working too.

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, instrument};

use super::provider::{HttpProviderConfig, HttpWalletProvider};
use crate::domain::{AuthError, AuthProvider, UserInfo, WalletProvider};

#[derive(Debug, Clone)]
pub struct NodeAuthConfig {
    pub rpc_url: String,
    pub provider: HttpProviderConfig,
    /// Profile reported by `user_info`.
    pub user: UserInfo,
    /// Key handed out for `private_key_method`, if the node cannot export one.
    pub exported_key: Option<SecretString>,
    pub private_key_method: String,
}

impl NodeAuthConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            provider: HttpProviderConfig::default(),
            user: UserInfo::default(),
            exported_key: None,
            private_key_method: "eth_private_key".to_string(),
        }
    }
}

pub struct NodeAuthProvider {
    config: NodeAuthConfig,
    session: Mutex<Option<Arc<HttpWalletProvider>>>,
}

impl NodeAuthProvider {
    pub fn new(config: NodeAuthConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    fn replace_session(
        &self,
        next: Option<Arc<HttpWalletProvider>>,
    ) -> Option<Arc<HttpWalletProvider>> {
        let mut slot = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, next)
    }
}

#[async_trait]
impl AuthProvider for NodeAuthProvider {
    #[instrument(skip(self), fields(rpc_url = %self.config.rpc_url))]
    async fn connect(&self) -> Result<Arc<dyn WalletProvider>, AuthError> {
        let mut provider = HttpWalletProvider::new(&self.config.rpc_url, self.config.provider.clone())
            .map_err(|e| AuthError::ConnectionFailed(e.to_string()))?;
        if let Some(key) = &self.config.exported_key {
            provider = provider.with_exported_key(&self.config.private_key_method, key.clone());
        }

        let chain_id = provider
            .request("eth_chainId", json!([]))
            .await
            .map_err(|e| AuthError::ConnectionFailed(e.to_string()))?;

        let provider = Arc::new(provider);
        if let Some(previous) = self.replace_session(Some(Arc::clone(&provider))) {
            previous.invalidate();
        }

        info!(chain_id = %chain_id, "Wallet session opened");
        Ok(provider as Arc<dyn WalletProvider>)
    }

    async fn user_info(&self) -> Result<UserInfo, AuthError> {
        if !self.is_connected() {
            return Err(AuthError::NotConnected);
        }
        Ok(self.config.user.clone())
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<(), AuthError> {
        let provider = self.replace_session(None).ok_or(AuthError::NotConnected)?;
        provider.invalidate();
        info!("Wallet session closed");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
