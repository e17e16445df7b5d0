//! Utility functions for loading proxy lists.

use crate::error::SourceError;

use reqwest::Client;
use std::path::Path;
use url::Url;

/// Fetch and parse a list of proxies from a URL or file path.
pub(crate) async fn fetch_proxies_from_source(source: &str) -> Result<Vec<String>, SourceError> {
    let content = match Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            let response = Client::new().get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SourceError::Status {
                    url: source.to_string(),
                    status,
                });
            }
            response.text().await?
        }
        _ => {
            let path = Path::new(source);
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| SourceError::Io {
                    path: path.to_path_buf(),
                    source,
                })?
        }
    };
    Ok(parse_proxy_list(&content))
}

/// Split a proxy list into addresses: one per line, trimmed, blank lines dropped.
pub(crate) fn parse_proxy_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
