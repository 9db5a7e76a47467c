use std::{sync::Arc, time::Duration};

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;

use crate::{
    Config, Diagram, PipeflowError, Result, TypeDictionary,
    canvas::{Canvas, RecordingCanvas},
    catalog::{CachedCatalog, CatalogService, HttpCatalogService, StaticCatalog},
};

/// Assembles a [`Diagram`] and its collaborators.
///
/// Without an explicit runtime the diagram spawns resolutions on the
/// ambient tokio runtime, or on a runtime of its own when built outside of
/// one. The canvas defaults to a [`RecordingCanvas`]; the catalog to an
/// HTTP service when `catalog.url` is configured and to an empty catalog
/// otherwise.
#[derive(Default)]
pub struct DiagramBuilder {
    config: Config,
    types: TypeDictionary,
    icons: TypeDictionary,
    canvas: Option<Arc<dyn Canvas>>,
    catalog: Option<Arc<dyn CatalogService>>,
    rt: Option<Arc<Runtime>>,
}

impl DiagramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    /// Name to type dictionary.
    pub fn types(
        mut self,
        types: TypeDictionary,
    ) -> Self {
        self.types = types;
        self
    }

    /// Type to icon path dictionary.
    pub fn icons(
        mut self,
        icons: TypeDictionary,
    ) -> Self {
        self.icons = icons;
        self
    }

    pub fn canvas(
        mut self,
        canvas: Arc<dyn Canvas>,
    ) -> Self {
        self.canvas = Some(canvas);
        self
    }

    pub fn catalog(
        mut self,
        catalog: Arc<dyn CatalogService>,
    ) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn runtime(
        mut self,
        runtime: Arc<Runtime>,
    ) -> Self {
        self.rt = Some(runtime);
        self
    }

    pub fn build(self) -> Result<Arc<Diagram>> {
        self.config.validate()?;

        let (handle, runtime) = match self.rt {
            Some(rt) => (rt.handle().clone(), Some(rt)),
            None => match Handle::try_current() {
                Ok(handle) => (handle, None),
                Err(_) => {
                    let rt = Builder::new_multi_thread()
                        .worker_threads(self.config.async_worker_thread_number.into())
                        .enable_all()
                        .build()
                        .map_err(|e| PipeflowError::Runtime(format!("failed to start runtime: {}", e)))?;
                    debug!(workers = self.config.async_worker_thread_number, "diagram runtime started");
                    let rt = Arc::new(rt);
                    (rt.handle().clone(), Some(rt))
                }
            },
        };

        let canvas = self.canvas.unwrap_or_else(|| Arc::new(RecordingCanvas::new()));
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => Self::default_catalog(&self.config)?,
        };

        let diagram = Diagram::new(self.config, self.types, self.icons, canvas, catalog, handle, runtime)?;
        Ok(Arc::new(diagram))
    }

    fn default_catalog(config: &Config) -> Result<Arc<dyn CatalogService>> {
        let Some(url) = &config.catalog.url else {
            return Ok(Arc::new(StaticCatalog::default()));
        };
        let http = HttpCatalogService::new(url.as_str(), Duration::from_millis(config.catalog.timeout_ms))?;
        Ok(Arc::new(CachedCatalog::new(Arc::new(http), Duration::from_secs(config.catalog.cache_ttl_secs))))
    }
}
