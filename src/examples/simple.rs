//! Simple example of using reqwest-proxy-manager.

use reqwest_middleware::ClientBuilder;
use reqwest_proxy_manager::{ProxyManagerConfig, ProxyManagerMiddleware};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Loading proxy list...");

    let config = ProxyManagerConfig::builder()
        // one proxy per line, e.g. `http://1.1.1.1:8080` or `socks5://2.2.2.2:1080`
        .source("./proxies.txt")
        .test_url("https://www.httpbin.org/ip")
        .probe_timeout(Duration::from_secs(5))
        .blacklist_threshold(3)
        .max_attempts(3)
        // send requests directly when every proxy is down
        .fallback_direct(true)
        .build();

    let middleware = ProxyManagerMiddleware::new(config).await;
    let manager = middleware.manager().clone();

    let client = ClientBuilder::new(reqwest::Client::new())
        .with(middleware)
        .build();

    println!("Sending request...");
    let response = client.get("https://httpbin.org/ip").send().await?;

    println!("Status: {}", response.status());
    println!("Response: {}", response.text().await?);
    println!("Pool: {:?}", manager.stats());

    Ok(())
}
