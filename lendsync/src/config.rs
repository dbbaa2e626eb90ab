//! Client configuration.

use std::time::Duration;

use tracing::warn;

/// Default API base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("lendsync/", env!("CARGO_PKG_VERSION"));

/// Configurable options for the API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all endpoint paths are joined against.
    pub base_url: String,

    /// Overall timeout for a single HTTP request. Zero disables it.
    pub request_timeout: Duration,

    /// Connection timeout (time to establish the initial connection).
    pub connect_timeout: Duration,

    /// User agent string.
    pub user_agent: String,

    /// Maximum idle connections to keep per host. Zero leaves the
    /// reqwest default in place.
    pub pool_max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            pool_max_idle_per_host: 10,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Load configuration from the environment, with `.env` support.
    ///
    /// Recognized variables: `LENDSYNC_API_URL`,
    /// `LENDSYNC_REQUEST_TIMEOUT_SECS`, `LENDSYNC_USER_AGENT`. Anything
    /// unset or unparseable falls back to the default.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(url) = std::env::var("LENDSYNC_API_URL") {
            config.base_url = url;
        }

        if let Ok(value) = std::env::var("LENDSYNC_REQUEST_TIMEOUT_SECS") {
            match value.parse::<u64>() {
                Ok(secs) => config.request_timeout = Duration::from_secs(secs),
                Err(_) => warn!(
                    value = %value,
                    "Invalid LENDSYNC_REQUEST_TIMEOUT_SECS; using default"
                ),
            }
        }

        if let Ok(agent) = std::env::var("LENDSYNC_USER_AGENT") {
            config.user_agent = agent;
        }

        config
    }

    /// Build a `reqwest::Client` from this configuration.
    pub fn build_http_client(&self) -> reqwest::Client {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .connect_timeout(self.connect_timeout);

        if self.request_timeout > Duration::ZERO {
            builder = builder.timeout(self.request_timeout);
        }

        if self.pool_max_idle_per_host > 0 {
            builder = builder.pool_max_idle_per_host(self.pool_max_idle_per_host);
        }

        builder.build().unwrap_or_else(|error| {
            warn!(
                error = %error,
                "Failed to build configured HTTP client; falling back to reqwest defaults"
            );
            reqwest::Client::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("lendsync/"));
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::default()
            .with_base_url("https://api.example.com")
            .with_request_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent");

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent");
    }
}
