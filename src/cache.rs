use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::error::{OgcError, Result};
use crate::models::ServiceType;

/// Operation kind under which parsed capabilities are cached
pub const CAPABILITIES: &str = "CAPABILITIES";

/// Operation kind under which parsed DescribeFeatureType documents are cached
pub const DESCRIBE_FEATURETYPE: &str = "DESCRIBE_FEATURETYPE";

/// Cache configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of cached documents
    pub max_entries: u64,
    /// Time-to-live of an entry; `None` keeps entries for the process lifetime
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            ttl: None,
        }
    }
}

/// `(service type, operation kind, key)` triple identifying one cached value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub service: ServiceType,
    pub operation: String,
    pub key: String,
}

impl CacheKey {
    pub fn new(service: ServiceType, operation: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            service,
            operation: operation.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.service, self.operation, self.key)
    }
}

type CachedValue = Arc<dyn Any + Send + Sync>;

/// In-memory memoization of parsed documents, shared by every endpoint.
///
/// Uses `moka`'s `try_get_with`, so concurrent requests for the same key wait
/// for a single producer to finish. Values are stored type-erased and
/// downcast on the way out; a failed producer leaves no entry behind.
pub struct CapabilitiesCache {
    cache: Cache<CacheKey, CachedValue>,
}

impl CapabilitiesCache {
    pub fn new(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_entries);
        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
        }
    }

    /// Return the value cached under `(service, operation, key)`, running
    /// `producer` only if no value is cached yet.
    ///
    /// Every concurrent caller of a failing producer receives the same error.
    pub async fn use_cache<T, F, Fut>(
        &self,
        producer: F,
        service: ServiceType,
        operation: &str,
        key: &str,
    ) -> std::result::Result<Arc<T>, Arc<OgcError>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let cache_key = CacheKey::new(service, operation, key);
        let init = {
            let cache_key = cache_key.clone();
            async move {
                debug!(key = %cache_key, "cache miss");
                producer().await.map(|value| Arc::new(value) as CachedValue)
            }
        };

        let value = self.cache.try_get_with(cache_key.clone(), init).await?;
        value.downcast::<T>().map_err(|_| {
            Arc::new(OgcError::Cache(format!(
                "value cached under {cache_key} has an unexpected type"
            )))
        })
    }

    pub fn contains(&self, service: ServiceType, operation: &str, key: &str) -> bool {
        self.cache
            .contains_key(&CacheKey::new(service, operation, key))
    }

    /// Number of cached values, after pending maintenance has run
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Forget every cached document; later loads fetch again
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for CapabilitiesCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
