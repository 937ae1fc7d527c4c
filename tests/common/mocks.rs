use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use ogc_capabilities::{CapabilitiesCache, DocumentFetcher, EndpointContext, OgcError, Result};

/// Serves canned documents by URL substring and records every request
pub struct FixtureFetcher {
    routes: Vec<(String, String)>,
    delay: Option<Duration>,
    requests: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer any URL containing `pattern` with `body`; first match wins
    pub fn route(mut self, pattern: &str, body: impl Into<String>) -> Self {
        self.routes.push((pattern.to_string(), body.into()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_matching(&self, pattern: &str) -> usize {
        self.requests()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }
}

impl Default for FixtureFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentFetcher for FixtureFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.routes
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| OgcError::HttpStatus {
                url: url.to_string(),
                status: 404,
                message: "Not Found".to_string(),
            })
    }
}

/// Fails every request with a server error
#[derive(Default)]
pub struct FailingFetcher {
    pub calls: AtomicUsize,
}

#[async_trait]
impl DocumentFetcher for FailingFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        Err(OgcError::HttpStatus {
            url: url.to_string(),
            status: 503,
            message: "Service Unavailable".to_string(),
        })
    }
}

/// Never answers
pub struct PendingFetcher;

#[async_trait]
impl DocumentFetcher for PendingFetcher {
    async fn fetch_text(&self, _url: &str) -> Result<String> {
        futures::future::pending().await
    }
}

/// Endpoint context around `fetcher` with a fresh cache
pub fn context_with(fetcher: Arc<dyn DocumentFetcher>) -> EndpointContext {
    EndpointContext::new(fetcher, Arc::new(CapabilitiesCache::default()))
}
