//! Proxy representation.

/// Transport family of a proxy, derived from its address scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    /// Plain HTTP or HTTPS proxy.
    Http,
    /// SOCKS proxy (`socks4://`, `socks5://`, `socks5h://`, ...).
    Socks,
}

impl ProxyKind {
    /// Classify an address. Anything not starting with `socks` is treated as HTTP.
    pub fn of(address: &str) -> Self {
        if address.starts_with("socks") {
            ProxyKind::Socks
        } else {
            ProxyKind::Http
        }
    }
}

/// A candidate proxy in the live pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    /// The address of the proxy (e.g. "socks5://127.0.0.1:1080").
    pub address: String,
    /// Number of failed validation probes. Successes never reset it.
    pub failed_attempts: u32,
}

impl Proxy {
    /// Create a fresh proxy with no recorded failures.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            failed_attempts: 0,
        }
    }

    /// Transport family of this proxy.
    pub fn kind(&self) -> ProxyKind {
        ProxyKind::of(&self.address)
    }

    /// Convert the proxy address to a reqwest::Proxy.
    pub fn to_reqwest_proxy(&self) -> Result<reqwest::Proxy, reqwest::Error> {
        reqwest::Proxy::all(&self.address)
    }
}
