use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::endpoint::DocumentFetcher;
use crate::error::{OgcError, Result};

/// Network settings for capability downloads
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request limit, seconds
    pub timeout_seconds: u64,
    /// Extra attempts after a retryable failure
    pub retry_attempts: u32,
    /// First backoff step, doubled on each retry
    pub retry_delay_ms: u64,
    /// Backoff ceiling, milliseconds
    pub max_retry_delay_ms: u64,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            max_retry_delay_ms: 30000,
            user_agent: format!("ogc-capabilities/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Async HTTP client for downloading service documents
pub struct AsyncHttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl AsyncHttpClient {
    /// Build a pooled client from `config`
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(OgcError::from)?;

        Ok(Self { client, config })
    }

    /// Download a document as text, retrying server errors and timeouts
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "fetching document");
        let response = self.get_response_with_retry(url).await?;
        response.text().await.map_err(OgcError::from)
    }

    async fn get_response_with_retry(&self, url: &str) -> Result<Response> {
        let mut attempt = 0;

        loop {
            match self.make_request(url).await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let error = OgcError::HttpStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                        message: format!(
                            "HTTP {}: {}",
                            status.as_u16(),
                            status.canonical_reason().unwrap_or("Unknown")
                        ),
                    };

                    // 4xx is final, 5xx may recover
                    if status.is_server_error() && attempt < self.config.retry_attempts {
                        warn!(url, status = status.as_u16(), attempt, "server error, retrying");
                        sleep(self.retry_delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }

                    return Err(error);
                }
                Err(error) => {
                    if attempt < self.config.retry_attempts && self.is_retryable_error(&error) {
                        warn!(url, error = %error, attempt, "request failed, retrying");
                        sleep(self.retry_delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(error);
                }
            }
        }
    }

    async fn make_request(&self, url: &str) -> Result<Response> {
        let limit = Duration::from_secs(self.config.timeout_seconds);
        timeout(limit, self.client.get(url).send())
            .await
            .map_err(|_| OgcError::Timeout {
                url: url.to_string(),
                timeout_seconds: self.config.timeout_seconds,
            })?
            .map_err(OgcError::from)
    }

    fn retry_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self
            .config
            .retry_delay_ms
            .saturating_mul(2_u64.saturating_pow(attempt));
        Duration::from_millis(delay_ms.min(self.config.max_retry_delay_ms))
    }

    /// Transport failures worth another attempt
    fn is_retryable_error(&self, error: &OgcError) -> bool {
        match error {
            OgcError::Http(reqwest_error) => {
                reqwest_error.is_timeout() || reqwest_error.is_connect() || reqwest_error.is_request()
            }
            OgcError::Timeout { .. } => true,
            _ => false,
        }
    }
}

#[async_trait]
impl DocumentFetcher for AsyncHttpClient {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.get_text(url).await
    }
}
