//! Link service - connect new financial accounts

use std::sync::Arc;

use tracing::info;

use crate::domain::result::{Error, Result};
use crate::ports::ProviderGateway;

/// User id sent with link sessions when none is given
pub const DEFAULT_USER_ID: &str = "user_123";

/// Service for the account-linking handshake
pub struct LinkService {
    gateway: Arc<dyn ProviderGateway>,
}

impl LinkService {
    pub fn new(gateway: Arc<dyn ProviderGateway>) -> Self {
        Self { gateway }
    }

    /// Start a link session and return its link token
    pub fn create_link_token(&self, user_id: &str) -> Result<String> {
        if user_id.trim().is_empty() {
            return Err(Error::validation("user id cannot be empty"));
        }
        info!(provider = self.gateway.name(), user_id, "Creating link token");
        self.gateway.create_link_token(user_id)
    }

    /// Exchange a public token from the link flow for an access credential
    pub fn exchange_public_token(&self, public_token: &str) -> Result<String> {
        let public_token = public_token.trim();
        if public_token.is_empty() {
            return Err(Error::validation("public token cannot be empty"));
        }
        info!(provider = self.gateway.name(), "Exchanging public token");
        self.gateway.exchange_public_token(public_token)
    }
}
