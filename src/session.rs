//! Explicit current-user holder.

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::models::{AuthUser, LoginInput};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The logged-in user, if any.
///
/// Created next to the [`ApiClient`] at application start and passed to the
/// views that need it. Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct Session {
    user: Arc<RwLock<Option<AuthUser>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Option<AuthUser> {
        self.user.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.user.read().await.is_some()
    }

    pub async fn set(&self, user: Option<AuthUser>) {
        *self.user.write().await = user;
    }

    /// Log in and remember the returned user.
    pub async fn login(&self, client: &ApiClient, input: &LoginInput) -> Result<AuthUser> {
        let response = client.auth().login(input).await?;
        let user = response
            .user()
            .ok_or_else(|| Error::DeserializationError("login response without user".to_string()))?;
        info!("Logged in as {}", user.username);
        self.set(Some(user.clone())).await;
        Ok(user)
    }

    /// Ask the server who is logged in and store the answer.
    pub async fn refresh(&self, client: &ApiClient) -> Result<Option<AuthUser>> {
        let user = client.auth().me().await?;
        self.set(user.clone()).await;
        Ok(user)
    }

    /// Log out. The local user is cleared even when the server call fails.
    pub async fn logout(&self, client: &ApiClient) -> Result<()> {
        let result = client.auth().logout().await;
        self.set(None).await;
        match &result {
            Ok(()) => info!("Logged out"),
            Err(e) => warn!("Logout request failed, session cleared locally: {}", e),
        }
        result
    }
}
