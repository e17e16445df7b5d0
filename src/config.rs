//! Configuration for the proxy manager.

use std::time::Duration;

/// Configuration for the proxy manager.
#[derive(Debug, Clone)]
pub struct ProxyManagerConfig {
    /// File path or `http(s)://` URL of the line-delimited proxy list.
    pub source: String,
    /// URL probed through a candidate proxy to decide whether it works.
    pub test_url: String,
    /// Hard timeout for a single probe.
    pub probe_timeout: Duration,
    /// Number of full pool scans before giving up.
    pub max_attempts: usize,
    /// Failed probes after which a proxy is blacklisted.
    pub blacklist_threshold: u32,
    /// Pause between outer attempts. Zero means retry immediately.
    pub attempt_delay: Duration,
    /// Timeout applied to requests sent through the middleware.
    pub request_timeout: Duration,
    /// Whether the middleware sends requests directly when no proxy is available.
    pub fallback_direct: bool,
}

impl ProxyManagerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProxyManagerConfigBuilder {
        ProxyManagerConfigBuilder::new()
    }
}

impl Default for ProxyManagerConfig {
    fn default() -> Self {
        ProxyManagerConfigBuilder::new().build()
    }
}

/// Builder for `ProxyManagerConfig`.
pub struct ProxyManagerConfigBuilder {
    source: Option<String>,
    test_url: Option<String>,
    probe_timeout: Option<Duration>,
    max_attempts: Option<usize>,
    blacklist_threshold: Option<u32>,
    attempt_delay: Option<Duration>,
    request_timeout: Option<Duration>,
    fallback_direct: Option<bool>,
}

impl ProxyManagerConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            source: None,
            test_url: None,
            probe_timeout: None,
            max_attempts: None,
            blacklist_threshold: None,
            attempt_delay: None,
            request_timeout: None,
            fallback_direct: None,
        }
    }

    /// Set the proxy list location.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the URL used to validate proxies.
    pub fn test_url(mut self, url: impl Into<String>) -> Self {
        self.test_url = Some(url.into());
        self
    }

    /// Set the timeout for a single validation probe.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    /// Set the number of outer search attempts.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set the number of failed probes that blacklists a proxy.
    pub fn blacklist_threshold(mut self, threshold: u32) -> Self {
        self.blacklist_threshold = Some(threshold);
        self
    }

    /// Set the pause between outer search attempts.
    pub fn attempt_delay(mut self, delay: Duration) -> Self {
        self.attempt_delay = Some(delay);
        self
    }

    /// Set the timeout for requests sent through the middleware.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set whether the middleware falls back to a direct request.
    pub fn fallback_direct(mut self, fallback: bool) -> Self {
        self.fallback_direct = Some(fallback);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ProxyManagerConfig {
        ProxyManagerConfig {
            source: self.source.unwrap_or_else(|| "./proxies.txt".to_string()),
            test_url: self.test_url.unwrap_or_else(|| "https://www.httpbin.org/ip".to_string()),
            probe_timeout: self.probe_timeout.unwrap_or(Duration::from_millis(5000)),
            max_attempts: self.max_attempts.unwrap_or(3),
            // A zero threshold would blacklist proxies that never failed.
            blacklist_threshold: self.blacklist_threshold.unwrap_or(3).max(1),
            attempt_delay: self.attempt_delay.unwrap_or(Duration::ZERO),
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(30)),
            fallback_direct: self.fallback_direct.unwrap_or(true),
        }
    }
}

impl Default for ProxyManagerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
