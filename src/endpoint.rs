//! Plumbing shared by the WMS and WFS endpoints.
//!
//! An endpoint starts its capabilities fetch the moment it is built. The
//! spawned task goes through the [`CapabilitiesCache`], publishes the parsed
//! document into a write-once cell on success, and is wrapped in a shared
//! future that every `is_ready` call awaits.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{self, BoxFuture, Shared};
use tracing::{info, warn};

use crate::cache::{CAPABILITIES, CacheConfig, CapabilitiesCache};
use crate::error::{EndpointError, OgcError, Result};
use crate::http_client::{AsyncHttpClient, HttpClientConfig};
use crate::models::ServiceType;
use crate::url::set_query_params;

/// Source of raw documents
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the body of `url` as text
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Collaborators injected into every endpoint
#[derive(Clone)]
pub struct EndpointContext {
    pub fetcher: Arc<dyn DocumentFetcher>,
    pub cache: Arc<CapabilitiesCache>,
}

impl EndpointContext {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, cache: Arc<CapabilitiesCache>) -> Self {
        Self { fetcher, cache }
    }

    /// HTTP fetching through [`AsyncHttpClient`] with a fresh cache
    pub fn with_http(http: HttpClientConfig, cache: &CacheConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(AsyncHttpClient::new(http)?),
            Arc::new(CapabilitiesCache::new(cache)),
        ))
    }
}

/// Canonical capabilities request for `url`
pub fn capabilities_request_url(url: &str, service: ServiceType) -> Result<String> {
    set_query_params(
        url,
        &[("SERVICE", service.as_str()), ("REQUEST", "GetCapabilities")],
    )
}

type ReadyFuture = Shared<BoxFuture<'static, std::result::Result<(), EndpointError>>>;

/// One in-flight or settled capabilities load
pub(crate) struct CapabilitiesLoad<T> {
    state: Arc<OnceLock<Arc<T>>>,
    ready: ReadyFuture,
}

impl<T: Send + Sync + 'static> CapabilitiesLoad<T> {
    /// Spawn the fetch-and-parse task for `capabilities_url`.
    ///
    /// A URL that could not be built settles the load immediately with that
    /// error. Must be called from within a Tokio runtime.
    pub(crate) fn start(
        context: &EndpointContext,
        service: ServiceType,
        capabilities_url: Result<String>,
        original_url: &str,
        parse: fn(&str) -> Result<T>,
    ) -> Self {
        let state = Arc::new(OnceLock::new());

        let capabilities_url = match capabilities_url {
            Ok(url) => url,
            Err(error) => {
                warn!(url = original_url, error = %error, "cannot build capabilities URL");
                let error = EndpointError::new(original_url, Arc::new(error));
                return Self {
                    state,
                    ready: future::ready(Err::<(), _>(error)).boxed().shared(),
                };
            }
        };

        let fetcher = context.fetcher.clone();
        let cache = context.cache.clone();
        let published = state.clone();
        let url = capabilities_url.clone();

        let handle = tokio::spawn(async move {
            let loaded = cache
                .use_cache(
                    || async {
                        let raw = fetcher.fetch_text(&url).await?;
                        parse(&raw)
                    },
                    service,
                    CAPABILITIES,
                    &url,
                )
                .await
                .map_err(|cause| {
                    warn!(service = %service, url = %url, error = %cause, "endpoint failed");
                    EndpointError::new(url.clone(), cause)
                })?;

            // The cell is only ever written here, once
            let _ = published.set(loaded);
            info!(service = %service, url = %url, "endpoint ready");
            Ok::<(), EndpointError>(())
        });

        let ready = async move {
            match handle.await {
                Ok(result) => result,
                Err(join_error) => Err(EndpointError::new(
                    capabilities_url,
                    Arc::new(OgcError::Task(join_error.to_string())),
                )),
            }
        }
        .boxed()
        .shared();

        Self { state, ready }
    }

    /// Wait for the load to settle
    pub(crate) async fn wait(&self) -> std::result::Result<(), EndpointError> {
        self.ready.clone().await
    }

    /// The parsed document, once the load succeeded
    pub(crate) fn get(&self) -> Option<&T> {
        self.state.get().map(Arc::as_ref)
    }
}
