//! Client configuration types.

use std::time::Duration;

/// Default Vessel API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.vesselapi.com/v1";

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("vesselapi-rust/", env!("CARGO_PKG_VERSION"));

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for the Vessel API client.
///
/// Built once and shared by every request the client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, endpoint paths are appended to it.
    pub base_url: String,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Retries allowed after the first attempt of a call.
    pub max_retries: u32,
    /// Timeout of a single attempt, body included.
    pub timeout: Duration,
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    max_retries: Option<u32>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Set the API base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the `User-Agent` header value.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the number of retries after the first attempt.
    ///
    /// Negative values mean no retries.
    #[must_use]
    pub fn max_retries(mut self, max_retries: i64) -> Self {
        self.max_retries = Some(u32::try_from(max_retries.max(0)).unwrap_or(u32::MAX));
        self
    }

    /// Set the per-attempt timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.vesselapi.com/v1");
        assert!(config.user_agent.starts_with("vesselapi-rust/"));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.pool_idle_per_host, 32);
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:8080/v1")
            .user_agent("fleet-monitor/2.0")
            .max_retries(5)
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .pool_idle_per_host(16)
            .build();

        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.user_agent, "fleet-monitor/2.0");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.pool_idle_per_host, 16);
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(90));
    }

    #[test]
    fn negative_retries_clamp_to_zero() {
        assert_eq!(ClientConfig::builder().max_retries(-1).build().max_retries, 0);
        assert_eq!(ClientConfig::builder().max_retries(i64::MIN).build().max_retries, 0);
        assert_eq!(ClientConfig::builder().max_retries(0).build().max_retries, 0);
        assert_eq!(
            ClientConfig::builder().max_retries(i64::MAX).build().max_retries,
            u32::MAX
        );
    }
}
