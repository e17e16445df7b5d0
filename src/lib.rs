//! # reqwest-proxy-manager
//!
//! A self-pruning proxy manager for reqwest.
//!
//! The manager loads candidate proxies from a line-delimited source, validates them
//! on demand against a reachability endpoint, and permanently blacklists proxies that
//! fail validation too often. Callers ask for a working proxy and get either an
//! address or `None`; no error ever crosses that boundary.

pub mod blacklist;
pub mod checker;
pub mod config;
pub mod error;
pub mod manager;
pub mod middleware;
pub mod picker;
pub mod proxy;
pub mod registry;
mod utils;

pub use blacklist::Blacklist;
pub use checker::{HttpChecker, ReachabilityChecker};
pub use config::{ProxyManagerConfig, ProxyManagerConfigBuilder};
pub use error::{NoProxyAvailable, SourceError};
pub use manager::{PoolStats, ProxyManager};
pub use middleware::ProxyManagerMiddleware;
pub use picker::{IndexPicker, RandomPicker, SeededPicker};
pub use proxy::{Proxy, ProxyKind};
pub use registry::ProxyRegistry;
