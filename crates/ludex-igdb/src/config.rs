//! Public configuration for the IGDB client.

use std::time::Duration;

/// Default IGDB v4 API root.
pub const DEFAULT_BASE_URL: &str = "https://api.igdb.com/v4";

/// Configuration for the IGDB client.
///
/// IGDB authenticates with a Twitch application: the client id goes in the
/// `Client-ID` header and an app access token in `Authorization: Bearer`.
///
/// # Example
///
/// ```
/// use ludex_igdb::IgdbClientConfig;
/// use std::time::Duration;
///
/// let config = IgdbClientConfig::new("client-id", "app-token")
///     .with_timeout(Duration::from_secs(10))
///     .with_max_retries(2);
/// ```
#[derive(Clone)]
pub struct IgdbClientConfig {
    pub(crate) base_url: String,
    pub(crate) client_id: String,
    pub(crate) access_token: String,
    pub(crate) user_agent: String,
    pub(crate) timeout: Duration,
    /// Retries for 5xx and network errors. Client errors are never retried.
    pub(crate) max_retries: u8,
    pub(crate) retry_base_delay: Duration,
}

impl IgdbClientConfig {
    /// Create a configuration with the given Twitch credentials.
    #[must_use]
    pub fn new(client_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: client_id.into(),
            access_token: access_token.into(),
            user_agent: concat!("ludex-igdb/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }

    /// Set the API root. Defaults to `https://api.igdb.com/v4`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-request timeout. Defaults to 10 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Defaults to 3 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff retries. Defaults to 500ms.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Whether both credentials are present.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.access_token.trim().is_empty()
    }
}

// Keep the token out of logs.
impl std::fmt::Debug for IgdbClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IgdbClientConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IgdbClientConfig::new("id", "token");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.user_agent.contains("ludex-igdb"));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 3);
        assert!(config.has_credentials());
    }

    #[test]
    fn test_builder_pattern() {
        let config = IgdbClientConfig::new("id", "token")
            .with_base_url("http://localhost:8080/v4")
            .with_user_agent("test-agent")
            .with_timeout(Duration::from_secs(60))
            .with_max_retries(5)
            .with_retry_delay(Duration::from_millis(10));

        assert_eq!(config.base_url, "http://localhost:8080/v4");
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_base_delay, Duration::from_millis(10));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = IgdbClientConfig::new("id", "super-secret");
        assert!(!format!("{config:?}").contains("super-secret"));
        assert!(!IgdbClientConfig::new("id", " ").has_credentials());
    }
}
