//! Reachability checks for candidate proxies.

use crate::proxy::ProxyKind;

use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use tokio::time;

/// Decides whether a proxy can currently reach a test endpoint.
///
/// Implementations never fail: every error, bad status, or timeout is reported as
/// `false`.
#[async_trait]
pub trait ReachabilityChecker: Send + Sync {
    async fn probe(&self, address: &str, test_url: &str, timeout: Duration) -> bool;
}

/// Probes a proxy with a single HTTP GET routed through it.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpChecker;

#[async_trait]
impl ReachabilityChecker for HttpChecker {
    async fn probe(&self, address: &str, test_url: &str, timeout: Duration) -> bool {
        debug!("Validating {:?} proxy {}", ProxyKind::of(address), address);
        let proxy = match reqwest::Proxy::all(address) {
            Ok(proxy) => proxy,
            Err(e) => {
                debug!("Validation failed for {}: invalid proxy address: {}", address, e);
                return false;
            }
        };

        // Create a client using this proxy
        let client = match reqwest::Client::builder()
            .proxy(proxy)
            .timeout(timeout)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                debug!("Validation failed for {}: {}", address, e);
                return false;
            }
        };

        // Dropping the send future on timeout cancels the request.
        match time::timeout(timeout, client.get(test_url).send()).await {
            Ok(Ok(resp)) if resp.status().is_success() => true,
            Ok(Ok(resp)) => {
                debug!("Validation failed for {}: status {}", address, resp.status());
                false
            }
            Ok(Err(e)) => {
                debug!("Validation failed for {}: {}", address, e);
                false
            }
            Err(_) => {
                debug!("Validation failed for {}: timed out after {:?}", address, timeout);
                false
            }
        }
    }
}
