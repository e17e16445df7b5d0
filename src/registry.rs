//! Live proxy pool and its blacklist.

use crate::blacklist::Blacklist;
use crate::error::SourceError;
use crate::picker::IndexPicker;
use crate::proxy::Proxy;
use crate::utils;

use log::{debug, info, warn};

/// What happened to a proxy after a failed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Still in the pool with the given failure count.
    Retained(u32),
    /// Removed from the pool and blacklisted.
    Blacklisted,
    /// The proxy was no longer in the pool.
    Missing,
}

/// The live pool of candidate proxies plus the addresses excluded from it.
///
/// Pool and blacklist are kept disjoint: blacklisting an address removes every pool
/// entry carrying it.
#[derive(Debug, Default, Clone)]
pub struct ProxyRegistry {
    pool: Vec<Proxy>,
    blacklist: Blacklist,
}

impl ProxyRegistry {
    /// Build a registry with one fresh proxy per address.
    pub fn from_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pool: addresses.into_iter().map(Proxy::new).collect(),
            blacklist: Blacklist::new(),
        }
    }

    /// Load a registry from a file path or `http(s)://` URL.
    pub async fn from_source(source: &str) -> Result<Self, SourceError> {
        let addresses = utils::fetch_proxies_from_source(source).await?;
        info!("Loaded {} proxies from {}", addresses.len(), source);
        Ok(Self::from_addresses(addresses))
    }

    /// Proxies currently in the pool.
    pub fn pool(&self) -> &[Proxy] {
        &self.pool
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Draw a candidate uniformly at random.
    ///
    /// Entries whose address is already blacklisted are dropped without being
    /// returned. Yields `None` once the pool is empty.
    pub fn pick(&mut self, picker: &dyn IndexPicker) -> Option<(usize, String)> {
        while !self.pool.is_empty() {
            let index = picker.pick(self.pool.len()) % self.pool.len();
            let address = &self.pool[index].address;
            if self.blacklist.contains(address) {
                debug!("Dropping stale blacklisted proxy {} from pool", address);
                self.pool.swap_remove(index);
                continue;
            }
            return Some((index, address.clone()));
        }
        None
    }

    /// Record a failed probe of the proxy drawn at `index`.
    ///
    /// Once the failure count reaches `threshold` the address is blacklisted and
    /// removed from the pool.
    pub fn record_failure(
        &mut self,
        index: usize,
        address: &str,
        threshold: u32,
    ) -> FailureOutcome {
        let index = match self.pool.get(index) {
            Some(proxy) if proxy.address == address => index,
            _ => match self.pool.iter().position(|p| p.address == address) {
                Some(found) => found,
                None => return FailureOutcome::Missing,
            },
        };

        let proxy = &mut self.pool[index];
        proxy.failed_attempts += 1;
        if proxy.failed_attempts < threshold {
            return FailureOutcome::Retained(proxy.failed_attempts);
        }

        warn!(
            "Blacklisting {:?} proxy {} after {} failed attempts",
            proxy.kind(),
            address,
            proxy.failed_attempts
        );
        self.blacklist.insert(address);
        self.pool.retain(|p| p.address != address);
        FailureOutcome::Blacklisted
    }
}
