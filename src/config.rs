//! Client configuration

use crate::Error;
use std::time::Duration;

/// Default JSON-RPC endpoint
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Default timeout for HTTP round-trips
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC ledger client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    /// Endpoint URL
    pub url: String,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl RpcConfig {
    /// Create a new RPC config
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Localhost validator
    pub fn localnet() -> Self {
        Self::new("http://127.0.0.1:8899")
    }

    /// Public devnet endpoint
    pub fn devnet() -> Self {
        Self::new("https://api.devnet.solana.com")
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        validate_http_url(&self.url, "RPC")
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RPC_URL)
    }
}

/// Configuration of the HTTP client talking to merchant endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestClientConfig {
    /// Request timeout
    pub timeout: Option<Duration>,
    /// `User-Agent` header sent with every request
    pub user_agent: Option<String>,
}

impl RequestClientConfig {
    pub fn new() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: None,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

impl Default for RequestClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_http_url(url: &str, what: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(Error::config(format!("{what} URL cannot be empty")));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::config(format!(
            "{what} URL must start with http:// or https://"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_config_defaults() {
        let config = RpcConfig::default();
        assert_eq!(config.url, DEFAULT_RPC_URL);
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rpc_config_builder() {
        let config = RpcConfig::devnet().with_timeout(Duration::from_secs(5));

        assert_eq!(config.url, "https://api.devnet.solana.com");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_rpc_config_validation() {
        assert!(RpcConfig::new("").validate().is_err());
        assert!(RpcConfig::new("ws://127.0.0.1:8900").validate().is_err());
        assert!(RpcConfig::localnet().validate().is_ok());
    }

    #[test]
    fn test_request_client_config() {
        let config = RequestClientConfig::new()
            .with_timeout(Duration::from_secs(10))
            .with_user_agent("wallet/1.0");
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.user_agent.as_deref(), Some("wallet/1.0"));
    }
}
