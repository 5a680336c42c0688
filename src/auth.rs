//! Bearer credential for the monitoring API
//!
//! The token is obtained by the login flow elsewhere; this module only
//! carries it and renders the `Authorization` header value.

use crate::config::Config;
use crate::error::{MonitorError, Result};

/// Bearer token attached to every API request
#[derive(Clone)]
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    /// Create auth handler from a raw token
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let token = token.trim();
        // Accept a token pasted together with its scheme
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

        if token.is_empty() {
            return Err(MonitorError::Auth("empty bearer token".into()));
        }
        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(MonitorError::Auth("bearer token contains whitespace".into()));
        }

        Ok(Self {
            token: token.to_string(),
        })
    }

    /// Auth handler from configuration; `None` when no token is configured
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        config.api_token.as_deref().map(Self::new).transpose()
    }

    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth").field("token", &"<redacted>").finish()
    }
}
