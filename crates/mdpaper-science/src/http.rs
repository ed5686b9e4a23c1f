use std::sync::Arc;
use std::time::{Duration, Instant};

use mdpaper_core::config::NetworkConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{Result, ScienceError};

// ─── ClientConfig ─────────────────────────────────────────────────────────────

/// Everything a source needs to build its HTTP client. One proxy address is
/// applied to every scheme.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    pub proxy: Option<String>,
    pub timeout: Duration,
    pub min_interval: Duration,
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

impl From<&NetworkConfig> for ClientConfig {
    fn from(net: &NetworkConfig) -> Self {
        Self {
            user_agent: net.user_agent.clone(),
            proxy: net.proxy.clone(),
            timeout: Duration::from_secs(net.timeout_secs),
            min_interval: Duration::from_millis(net.min_interval_ms),
            max_retries: net.max_retries,
        }
    }
}

impl ClientConfig {
    /// Same settings without request spacing; used by tests against local mocks.
    pub fn unthrottled() -> Self {
        Self {
            min_interval: Duration::ZERO,
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Proxy as a URL; a bare `host:port` means plain http.
    pub fn proxy_url(&self) -> Option<String> {
        let proxy = self.proxy.as_deref()?.trim();
        if proxy.is_empty() {
            None
        } else if proxy.contains("://") {
            Some(proxy.to_string())
        } else {
            Some(format!("http://{proxy}"))
        }
    }
}

// ─── RateLimitedClient ────────────────────────────────────────────────────────

pub struct RateLimitedClient {
    client: reqwest::Client,
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
    max_retries: u32,
}

impl RateLimitedClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .gzip(true);
        if let Some(proxy) = config.proxy_url() {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }
        Ok(Self {
            client: builder.build()?,
            min_interval: config.min_interval,
            last_request: Arc::new(Mutex::new(None)),
            max_retries: config.max_retries,
        })
    }

    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(t) = *last {
            let elapsed = t.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn send(&self, url: &str, headers: HeaderMap) -> Result<reqwest::Response> {
        let mut attempt = 0u32;
        loop {
            self.wait_for_rate_limit().await;
            let resp = self.client.get(url).headers(headers.clone()).send().await;
            match resp {
                Ok(r) if r.status() == 429 => {
                    let wait = r
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    if attempt >= self.max_retries {
                        return Err(ScienceError::RateLimit(url.to_string(), wait));
                    }
                    sleep(Duration::from_secs(wait)).await;
                    attempt += 1;
                }
                Ok(r) if !r.status().is_success() => {
                    let status = r.status().as_u16();
                    let body = r.text().await.unwrap_or_default();
                    return Err(ScienceError::ApiError(
                        url.to_string(),
                        format!("HTTP {status}: {}", truncate(&body, 200)),
                    ));
                }
                Ok(r) => return Ok(r),
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(ScienceError::Http(e));
                    }
                    let backoff = 2u64.pow(attempt);
                    sleep(Duration::from_secs(backoff)).await;
                    attempt += 1;
                }
            }
        }
    }

    pub async fn get(&self, url: &str) -> Result<String> {
        self.get_with_headers(url, HeaderMap::new()).await
    }

    pub async fn get_with_headers(&self, url: &str, headers: HeaderMap) -> Result<String> {
        let resp = self.send(url, headers).await?;
        resp.text().await.map_err(ScienceError::Http)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let text = self.get(url).await?;
        serde_json::from_str(&text).map_err(|e| ScienceError::Parse(e.to_string()))
    }

    /// Raw body, asking for a PDF when the server negotiates content.
    pub async fn get_pdf_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/pdf, application/octet-stream;q=0.9, */*;q=0.1"),
        );
        let resp = self.send(url, headers).await?;
        let bytes = resp.bytes().await.map_err(ScienceError::Http)?;
        Ok(bytes.to_vec())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn proxy_url_normalization() {
        let mut cfg = ClientConfig::default();
        assert_eq!(cfg.proxy_url(), None);

        cfg.proxy = Some("127.0.0.1:7890".to_string());
        assert_eq!(cfg.proxy_url().as_deref(), Some("http://127.0.0.1:7890"));

        cfg.proxy = Some("socks5://127.0.0.1:1080".to_string());
        assert_eq!(cfg.proxy_url().as_deref(), Some("socks5://127.0.0.1:1080"));

        cfg.proxy = Some("   ".to_string());
        assert_eq!(cfg.proxy_url(), None);
    }

    #[test]
    fn builds_client_with_proxy() {
        let cfg = ClientConfig {
            proxy: Some("127.0.0.1:7890".to_string()),
            ..ClientConfig::unthrottled()
        };
        assert!(RateLimitedClient::new(&cfg).is_ok());
    }

    #[test]
    fn config_from_network_section() {
        let net = NetworkConfig {
            proxy: Some("127.0.0.1:7890".to_string()),
            timeout_secs: 7,
            min_interval_ms: 250,
            ..NetworkConfig::default()
        };
        let cfg = ClientConfig::from(&net);
        assert_eq!(cfg.timeout, Duration::from_secs(7));
        assert_eq!(cfg.min_interval, Duration::from_millis(250));
        assert_eq!(cfg.proxy.as_deref(), Some("127.0.0.1:7890"));
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("Resource not found.")
            .create_async()
            .await;

        let client = RateLimitedClient::new(&ClientConfig::unthrottled()).unwrap();
        let err = client
            .get(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();
        match err {
            ScienceError::ApiError(_, msg) => assert!(msg.contains("404")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn rate_limited_request_is_retried() {
        let mut server = Server::new_async().await;
        let limited = server
            .mock("GET", "/works")
            .with_status(429)
            .with_header("retry-after", "0")
            .expect(2)
            .create_async()
            .await;

        let cfg = ClientConfig {
            max_retries: 1,
            ..ClientConfig::unthrottled()
        };
        let client = RateLimitedClient::new(&cfg).unwrap();
        let err = client
            .get(&format!("{}/works", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScienceError::RateLimit(_, 0)));
        limited.assert_async().await;
    }
}
