//! Client configuration

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_BASE_URL: &str = "https://api.paystack.co";
pub const DEFAULT_USER_AGENT: &str = "Paystack-MCP-Client";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`crate::PaystackClient`]
#[derive(Clone)]
pub struct ClientConfig {
    /// Secret key sent as a bearer token
    pub secret_key: String,
    /// API base URL, without a trailing path
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the key
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.secret_key.trim().is_empty() {
            return Err(ClientError::MissingSecretKey);
        }
        Ok(())
    }
}

// The secret key never reaches logs
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("secret_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}
