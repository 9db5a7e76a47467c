use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::trace;

use crate::{Catalog, Result, common::MemCache};

use super::CatalogService;

/// Reuses a fetched catalog for a while.
///
/// Failed fetches are not cached.
#[derive(Clone)]
pub struct CachedCatalog {
    inner: Arc<dyn CatalogService>,
    cache: MemCache<(), Catalog>,
}

impl CachedCatalog {
    pub fn new(
        inner: Arc<dyn CatalogService>,
        ttl: Duration,
    ) -> Self {
        Self {
            inner,
            cache: MemCache::with_ttl(4, ttl),
        }
    }

    /// Drop the cached catalog so the next fetch goes to the inner service.
    pub fn invalidate(&self) {
        self.cache.remove(&());
    }
}

#[async_trait]
impl CatalogService for CachedCatalog {
    async fn fetch(&self) -> Result<Catalog> {
        if let Some(catalog) = self.cache.get(&()) {
            trace!("catalog cache hit");
            return Ok(catalog);
        }

        let catalog = self.inner.fetch().await?;
        self.cache.set((), catalog.clone());
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{CatalogEntry, PipeflowError};

    struct CountingCatalog {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl CatalogService for CountingCatalog {
        async fn fetch(&self) -> Result<Catalog> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PipeflowError::Catalog("down".to_string()));
            }
            Ok(Catalog::from(vec![CatalogEntry::new("Echo")]))
        }
    }

    #[tokio::test]
    async fn test_second_fetch_hits_cache() {
        let inner = Arc::new(CountingCatalog {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let cached = CachedCatalog::new(inner.clone(), Duration::from_secs(60));

        cached.fetch().await.unwrap();
        cached.fetch().await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        cached.invalidate();
        cached.fetch().await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let inner = Arc::new(CountingCatalog {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let cached = CachedCatalog::new(inner.clone(), Duration::from_secs(60));

        assert!(cached.fetch().await.is_err());
        assert!(cached.fetch().await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
