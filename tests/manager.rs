use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest_proxy_manager::{
    IndexPicker, ProxyManager, ProxyManagerConfig, RandomPicker, ReachabilityChecker, SeededPicker,
};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Answers probes from a per-address script, falling back to `default`.
struct Scripted {
    default: bool,
    scripts: Mutex<HashMap<String, VecDeque<bool>>>,
    probed: Mutex<Vec<String>>,
}

impl Scripted {
    fn always(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            default: answer,
            scripts: Mutex::new(HashMap::new()),
            probed: Mutex::new(Vec::new()),
        })
    }

    fn with_script(address: &str, answers: &[bool]) -> Arc<Self> {
        let checker = Self::always(false);
        checker
            .scripts
            .lock()
            .insert(address.to_string(), answers.iter().copied().collect());
        checker
    }

    fn probes(&self) -> usize {
        self.probed.lock().len()
    }
}

#[async_trait]
impl ReachabilityChecker for Scripted {
    async fn probe(&self, address: &str, _test_url: &str, _timeout: Duration) -> bool {
        self.probed.lock().push(address.to_string());
        self.scripts
            .lock()
            .get_mut(address)
            .and_then(VecDeque::pop_front)
            .unwrap_or(self.default)
    }
}

/// Replays a fixed index sequence, then always picks 0.
struct Sequence(Mutex<VecDeque<usize>>);

impl Sequence {
    fn new(indices: &[usize]) -> Box<Self> {
        Box::new(Self(Mutex::new(indices.iter().copied().collect())))
    }
}

impl IndexPicker for Sequence {
    fn pick(&self, len: usize) -> usize {
        self.0.lock().pop_front().unwrap_or(0).min(len - 1)
    }
}

fn proxy_file(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

/// Serves `body` with `status_line` to every request and returns the list URL.
async fn serve_list(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{}/proxies.txt", addr)
}

fn config_for(file: &tempfile::NamedTempFile) -> ProxyManagerConfig {
    ProxyManagerConfig::builder()
        .source(file.path().to_str().unwrap())
        .build()
}

#[tokio::test]
async fn failing_proxies_are_blacklisted_until_pool_is_empty() {
    let file = proxy_file(&["http://1.1.1.1:8080", "", "  socks5://2.2.2.2:1080  "]);
    let checker = Scripted::always(false);
    let picker = Box::new(SeededPicker::new(42));
    let manager = ProxyManager::with_parts(config_for(&file), checker.clone(), picker).await;

    assert_eq!(manager.stats().live, 2);
    assert_eq!(manager.get_proxy_with_retry().await, None);

    assert!(manager.proxies().is_empty());
    assert_eq!(
        manager.blacklisted(),
        vec!["http://1.1.1.1:8080".to_string(), "socks5://2.2.2.2:1080".to_string()]
    );
    // Three failures each; later attempts find the pool already empty.
    assert_eq!(checker.probes(), 6);

    assert_eq!(manager.get_proxy_with_retry().await, None);
    assert_eq!(checker.probes(), 6);
}

#[tokio::test]
async fn missing_source_degrades_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = ProxyManagerConfig::builder()
        .source(dir.path().join("proxies.txt").to_str().unwrap())
        .build();
    let checker = Scripted::always(true);
    let manager = ProxyManager::with_parts(config, checker.clone(), Box::new(RandomPicker)).await;

    assert!(manager.is_degraded());
    for _ in 0..3 {
        assert_eq!(manager.get_proxy_with_retry().await, None);
    }
    assert_eq!(manager.find_working().await, None);
    assert_eq!(checker.probes(), 0);
    assert!(manager.stats().degraded);
}

#[tokio::test]
async fn working_proxy_is_returned_and_kept() {
    let file = proxy_file(&["http://3.3.3.3:8080"]);
    let checker = Scripted::always(true);
    let manager =
        ProxyManager::with_parts(config_for(&file), checker.clone(), Box::new(RandomPicker)).await;

    assert_eq!(
        manager.get_proxy_with_retry().await.as_deref(),
        Some("http://3.3.3.3:8080")
    );
    let proxies = manager.proxies();
    assert_eq!(proxies.len(), 1);
    assert_eq!(proxies[0].address, "http://3.3.3.3:8080");
    assert_eq!(proxies[0].failed_attempts, 0);
    assert_eq!(checker.probes(), 1);
}

#[tokio::test]
async fn proxy_recovering_before_threshold_is_returned() {
    let address = "http://3.3.3.3:8080";
    let checker = Scripted::with_script(address, &[false, false, true]);
    let manager = ProxyManager::from_addresses(
        [address],
        ProxyManagerConfig::default(),
        checker.clone(),
        Box::new(RandomPicker),
    );

    assert_eq!(manager.get_proxy_with_retry().await.as_deref(), Some(address));
    assert_eq!(checker.probes(), 3);

    let proxies = manager.proxies();
    assert_eq!(proxies.len(), 1);
    assert_eq!(proxies[0].failed_attempts, 2);
    assert!(manager.blacklisted().is_empty());
}

#[tokio::test]
async fn success_does_not_reset_failures() {
    let address = "http://3.3.3.3:8080";
    // Two failures, a success, then one more failure crosses the threshold.
    let checker = Scripted::with_script(address, &[false, false, true, false]);
    let manager = ProxyManager::from_addresses(
        [address],
        ProxyManagerConfig::default(),
        checker.clone(),
        Box::new(RandomPicker),
    );

    assert_eq!(manager.find_working().await.as_deref(), Some(address));
    assert_eq!(manager.find_working().await, None);
    assert!(manager.is_blacklisted(address));
    assert_eq!(checker.probes(), 4);
}

#[tokio::test]
async fn random_draw_may_repeat_failed_proxy() {
    let bad = "http://1.1.1.1:8080";
    let good = "http://4.4.4.4:8080";
    let checker = Scripted::with_script(good, &[true]);
    let manager = ProxyManager::from_addresses(
        [bad, good],
        ProxyManagerConfig::default(),
        checker.clone(),
        Sequence::new(&[0, 0, 1]),
    );

    assert_eq!(manager.get_proxy_with_retry().await.as_deref(), Some(good));
    assert_eq!(*checker.probed.lock(), vec![bad, bad, good]);

    let failed: Vec<u32> = manager.proxies().iter().map(|p| p.failed_attempts).collect();
    assert_eq!(failed, vec![2, 0]);
}

#[tokio::test]
async fn blacklisted_proxy_is_never_returned_again() {
    let flaky = "http://1.1.1.1:8080";
    let steady = "http://4.4.4.4:8080";
    let checker = Scripted::with_script(flaky, &[false, false, false, true, true]);
    checker
        .scripts
        .lock()
        .insert(steady.to_string(), std::iter::repeat_n(true, 64).collect());
    let manager = ProxyManager::from_addresses(
        [flaky, steady],
        ProxyManagerConfig::default(),
        checker.clone(),
        Sequence::new(&[0, 0, 0]),
    );

    for _ in 0..20 {
        assert_eq!(manager.get_proxy_with_retry().await.as_deref(), Some(steady));
    }
    assert!(manager.is_blacklisted(flaky));
    assert_eq!(checker.probed.lock().iter().filter(|a| *a == flaky).count(), 3);
}

#[tokio::test]
async fn configured_threshold_applies() {
    let address = "socks5://2.2.2.2:1080";
    let config = ProxyManagerConfig::builder().blacklist_threshold(5).build();
    let checker = Scripted::always(false);
    let manager =
        ProxyManager::from_addresses([address], config, checker.clone(), Box::new(RandomPicker));

    assert_eq!(manager.get_proxy_with_retry().await, None);
    assert_eq!(checker.probes(), 5);
    assert!(manager.is_blacklisted(address));
}

#[tokio::test(start_paused = true)]
async fn outer_attempts_are_bounded() {
    let delay = Duration::from_secs(1);
    let config = ProxyManagerConfig::builder()
        .max_attempts(3)
        .attempt_delay(delay)
        .build();
    let checker = Scripted::always(true);
    let manager = ProxyManager::from_addresses(
        Vec::<String>::new(),
        config,
        checker.clone(),
        Box::new(RandomPicker),
    );

    let started = tokio::time::Instant::now();
    assert_eq!(manager.get_proxy_with_retry().await, None);
    // Three attempts are separated by exactly two pauses.
    assert_eq!(started.elapsed(), delay * 2);
    assert_eq!(checker.probes(), 0);
}

#[tokio::test]
async fn proxy_list_is_fetched_from_url() {
    let body = "http://1.1.1.1:8080\n\n   \n  socks5://2.2.2.2:1080  \n";
    let url = serve_list("200 OK", body).await;
    let config = ProxyManagerConfig::builder().source(url).build();
    let checker = Scripted::always(true);
    let manager = ProxyManager::with_parts(config, checker, Box::new(RandomPicker)).await;

    assert!(!manager.is_degraded());
    let addresses: Vec<String> = manager.proxies().into_iter().map(|p| p.address).collect();
    assert_eq!(addresses, vec!["http://1.1.1.1:8080", "socks5://2.2.2.2:1080"]);
    assert!(manager.proxies().iter().all(|p| p.failed_attempts == 0));
}

#[tokio::test]
async fn error_status_from_list_url_degrades() {
    let url = serve_list("500 Internal Server Error", "http://1.1.1.1:8080\n").await;
    let config = ProxyManagerConfig::builder().source(url).build();
    let checker = Scripted::always(true);
    let manager = ProxyManager::with_parts(config, checker.clone(), Box::new(RandomPicker)).await;

    assert!(manager.is_degraded());
    assert_eq!(manager.stats().live, 0);
    assert_eq!(manager.get_proxy_with_retry().await, None);
    assert_eq!(checker.probes(), 0);
}
