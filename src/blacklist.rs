//! Permanent exclusion list for proxies that failed too often.

use std::collections::HashSet;

/// Append-only set of blacklisted proxy addresses.
///
/// There is no removal API: an address stays blacklisted for the lifetime of the
/// manager that owns it.
#[derive(Debug, Default, Clone)]
pub struct Blacklist {
    addresses: HashSet<String>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address. Returns `false` if it was already blacklisted.
    pub fn insert(&mut self, address: impl Into<String>) -> bool {
        self.addresses.insert(address.into())
    }

    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.addresses.iter().map(String::as_str)
    }
}
