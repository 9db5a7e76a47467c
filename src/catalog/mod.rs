//! Catalog services.
//!
//! A catalog service hands out the list of activity type definitions that
//! activity pipes consult once it arrives. The catalog is fetched whole; no
//! arguments are needed.

mod cached;
mod http;

use async_trait::async_trait;

use crate::{Catalog, Result};

pub use cached::CachedCatalog;
pub use http::HttpCatalogService;

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch the complete type catalog.
    async fn fetch(&self) -> Result<Catalog>;
}

/// Catalog known up front.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    catalog: Catalog,
}

impl StaticCatalog {
    pub fn new(catalog: impl Into<Catalog>) -> Self {
        Self {
            catalog: catalog.into(),
        }
    }
}

#[async_trait]
impl CatalogService for StaticCatalog {
    async fn fetch(&self) -> Result<Catalog> {
        Ok(self.catalog.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::CatalogEntry;

    #[tokio::test]
    async fn test_static_catalog() {
        let service: Arc<dyn CatalogService> = Arc::new(StaticCatalog::new(vec![CatalogEntry::new("Echo")]));
        let catalog = service.fetch().await.unwrap();
        assert!(catalog.entry("Echo").is_some());
        assert!(StaticCatalog::default().fetch().await.unwrap().is_empty());
    }
}
