//! Core proxy manager: working-proxy search with bounded retries.

use crate::checker::{HttpChecker, ReachabilityChecker};
use crate::config::ProxyManagerConfig;
use crate::picker::{IndexPicker, RandomPicker};
use crate::proxy::Proxy;
use crate::registry::{FailureOutcome, ProxyRegistry};

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time;

/// Snapshot of the manager's pool state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Proxies still eligible for selection.
    pub live: usize,
    /// Proxies permanently excluded.
    pub blacklisted: usize,
    /// True when the proxy source could not be loaded.
    pub degraded: bool,
}

/// Hands out validated proxies and retires the ones that keep failing.
///
/// A manager whose source could not be read is *degraded*: it never yields a proxy
/// and never errors.
pub struct ProxyManager {
    /// `None` in degraded mode.
    registry: Option<Mutex<ProxyRegistry>>,
    /// Configuration for the manager.
    pub config: ProxyManagerConfig,
    checker: Arc<dyn ReachabilityChecker>,
    picker: Box<dyn IndexPicker>,
    /// Serializes searches so at most one probe is in flight.
    search: tokio::sync::Mutex<()>,
}

impl ProxyManager {
    /// Load proxies from `config.source` and validate them over HTTP.
    pub async fn new(config: ProxyManagerConfig) -> Self {
        Self::with_parts(config, Arc::new(HttpChecker), Box::new(RandomPicker)).await
    }

    /// Load proxies from `config.source` using the given checker and picker.
    ///
    /// A source that cannot be read yields a degraded manager.
    pub async fn with_parts(
        config: ProxyManagerConfig,
        checker: Arc<dyn ReachabilityChecker>,
        picker: Box<dyn IndexPicker>,
    ) -> Self {
        let registry = match ProxyRegistry::from_source(&config.source).await {
            Ok(registry) => Some(registry),
            Err(e) => {
                error!("Failed to load proxies, running without a proxy pool: {}", e);
                None
            }
        };
        Self::assemble(registry, config, checker, picker)
    }

    /// Build a manager over an in-memory address list.
    pub fn from_addresses<I, S>(
        addresses: I,
        config: ProxyManagerConfig,
        checker: Arc<dyn ReachabilityChecker>,
        picker: Box<dyn IndexPicker>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::assemble(Some(ProxyRegistry::from_addresses(addresses)), config, checker, picker)
    }

    /// Build a manager that always answers `None`.
    pub fn degraded(config: ProxyManagerConfig) -> Self {
        Self::assemble(None, config, Arc::new(HttpChecker), Box::new(RandomPicker))
    }

    fn assemble(
        registry: Option<ProxyRegistry>,
        config: ProxyManagerConfig,
        checker: Arc<dyn ReachabilityChecker>,
        picker: Box<dyn IndexPicker>,
    ) -> Self {
        if let Some(registry) = &registry {
            info!("Proxy manager ready with {} proxies", registry.len());
        }
        Self {
            registry: registry.map(Mutex::new),
            config,
            checker,
            picker,
            search: tokio::sync::Mutex::new(()),
        }
    }

    /// Return a validated proxy address, or `None` if none could be found within
    /// `config.max_attempts` full searches.
    pub async fn get_proxy_with_retry(&self) -> Option<String> {
        if self.registry.is_none() {
            return None;
        }

        for attempt in 1..=self.config.max_attempts {
            if let Some(address) = self.find_working().await {
                return Some(address);
            }
            if attempt < self.config.max_attempts && !self.config.attempt_delay.is_zero() {
                debug!(
                    "No proxy found on attempt {}, retrying in {:?}",
                    attempt, self.config.attempt_delay
                );
                time::sleep(self.config.attempt_delay).await;
            }
        }
        None
    }

    /// Run one search over the live pool.
    ///
    /// Draws proxies at random and probes them until one passes or the pool is
    /// empty. Each failure counts against the drawn proxy; reaching
    /// `config.blacklist_threshold` blacklists it.
    pub async fn find_working(&self) -> Option<String> {
        let registry = self.registry.as_ref()?;
        let _guard = self.search.lock().await;

        loop {
            let candidate = registry.lock().pick(self.picker.as_ref());
            let Some((index, address)) = candidate else {
                error!("No working proxies left");
                return None;
            };

            let reachable = self
                .checker
                .probe(&address, &self.config.test_url, self.config.probe_timeout)
                .await;
            if reachable {
                debug!("Proxy {} passed validation", address);
                return Some(address);
            }

            let outcome = registry
                .lock()
                .record_failure(index, &address, self.config.blacklist_threshold);
            match outcome {
                FailureOutcome::Retained(failures) => {
                    debug!("Proxy {} failed validation ({} failures)", address, failures)
                }
                FailureOutcome::Blacklisted => {}
                FailureOutcome::Missing => {
                    warn!("Proxy {} left the pool during validation", address)
                }
            }
        }
    }

    /// Get statistics about the proxy pool.
    pub fn stats(&self) -> PoolStats {
        match &self.registry {
            Some(registry) => {
                let registry = registry.lock();
                PoolStats {
                    live: registry.len(),
                    blacklisted: registry.blacklist().len(),
                    degraded: false,
                }
            }
            None => PoolStats {
                live: 0,
                blacklisted: 0,
                degraded: true,
            },
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.registry.is_none()
    }

    /// Proxies currently in the live pool.
    pub fn proxies(&self) -> Vec<Proxy> {
        self.registry
            .as_ref()
            .map(|registry| registry.lock().pool().to_vec())
            .unwrap_or_default()
    }

    /// Blacklisted addresses, sorted.
    pub fn blacklisted(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self
            .registry
            .as_ref()
            .map(|registry| registry.lock().blacklist().iter().map(str::to_string).collect())
            .unwrap_or_default();
        addresses.sort();
        addresses
    }

    pub fn is_blacklisted(&self, address: &str) -> bool {
        self.registry
            .as_ref()
            .is_some_and(|registry| registry.lock().blacklist().contains(address))
    }
}
