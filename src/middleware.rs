//! Middleware implementation for reqwest.

use crate::config::ProxyManagerConfig;
use crate::error::NoProxyAvailable;
use crate::manager::ProxyManager;

use anyhow::anyhow;
use async_trait::async_trait;
use log::{info, warn};
use reqwest_middleware::{Error, Middleware, Next, Result};
use std::sync::Arc;

/// Middleware that routes each request through a proxy handed out by a
/// [`ProxyManager`].
///
/// When the manager has no working proxy the request is either sent directly
/// (`fallback_direct`) or rejected with [`NoProxyAvailable`].
#[derive(Clone)]
pub struct ProxyManagerMiddleware {
    manager: Arc<ProxyManager>,
}

impl ProxyManagerMiddleware {
    /// Create a middleware that loads its proxy list from `config.source`.
    pub async fn new(config: ProxyManagerConfig) -> Self {
        let manager = ProxyManager::new(config).await;
        let stats = manager.stats();
        if !stats.degraded {
            info!("Proxy manager initialized with {} proxies", stats.live);
        }
        Self::from_manager(Arc::new(manager))
    }

    /// Wrap an existing manager.
    pub fn from_manager(manager: Arc<ProxyManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<ProxyManager> {
        &self.manager
    }
}

#[async_trait]
impl Middleware for ProxyManagerMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> Result<reqwest::Response> {
        let config = &self.manager.config;

        let Some(proxy_url) = self.manager.get_proxy_with_retry().await else {
            if config.fallback_direct {
                warn!("No proxy available, sending {} directly", req.url());
                return next.run(req, extensions).await;
            }
            return Err(Error::Middleware(anyhow!(NoProxyAvailable)));
        };

        info!("Using proxy: {}", proxy_url);
        let reqwest_proxy = reqwest::Proxy::all(&proxy_url).map_err(Error::Reqwest)?;

        // Build a new client with the proxy
        let client = reqwest::Client::builder()
            .proxy(reqwest_proxy)
            .timeout(config.request_timeout)
            .build()
            .map_err(Error::Reqwest)?;

        client.execute(req).await.map_err(Error::Reqwest)
    }
}
