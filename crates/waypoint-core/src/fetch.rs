use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use tracing::debug;

use crate::error::ConfigError;
use crate::payload::{self, SealedConfig};

const USER_AGENT: &str = concat!("waypoint-core/", env!("CARGO_PKG_VERSION"));

/// Transport used to retrieve the sealed payload body.
///
/// Abstracted so bootstrap logic can be exercised without a network; the
/// production implementation is [`HttpTransport`].
#[async_trait]
pub trait ConfigTransport: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, ConfigError>;
}

/// HTTPS transport with caching disabled end to end.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        // The payload rotates server-side; stale intermediary copies must not
        // be served.
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::FetchFailed(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ConfigTransport for HttpTransport {
    async fn fetch_text(&self, url: &str) -> Result<String, ConfigError> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ConfigError::FetchFailed(e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            return Err(ConfigError::Fetch {
                status: status.as_u16(),
            });
        }
        res.text()
            .await
            .map_err(|e| ConfigError::FetchFailed(e.to_string()))
    }
}

/// Fetches and parses the sealed payload from a fixed endpoint.
pub struct ConfigFetcher<T: ConfigTransport> {
    transport: T,
    conf_url: String,
}

impl<T: ConfigTransport> ConfigFetcher<T> {
    pub fn new(transport: T, conf_url: impl Into<String>) -> Self {
        Self {
            transport,
            conf_url: conf_url.into(),
        }
    }

    pub fn conf_url(&self) -> &str {
        &self.conf_url
    }

    pub async fn fetch(&self) -> Result<SealedConfig, ConfigError> {
        debug!(url = %self.conf_url, "fetching sealed config");
        let body = self.transport.fetch_text(&self.conf_url).await?;
        payload::parse_sealed_response(&body)
    }
}
