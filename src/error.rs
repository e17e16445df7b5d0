//! Error types for the reqwest-proxy-manager crate.

use std::path::PathBuf;
use thiserror::Error;

/// Error returned when no working proxy could be found and the caller chose not to
/// proceed without one.
#[derive(Debug, Error)]
#[error("No proxy available in pool")]
pub struct NoProxyAvailable;

/// Failure to read a proxy source.
///
/// Never escapes [`ProxyManager`](crate::ProxyManager): a source error puts the
/// manager into degraded mode instead.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read proxy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch proxy list: {0}")]
    Http(#[from] reqwest::Error),
    #[error("proxy list at {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}
