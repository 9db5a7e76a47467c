use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::debug;

use crate::{Catalog, PipeflowError, Result};

use super::CatalogService;

/// Fetches the catalog as JSON with a plain `GET`.
#[derive(Debug, Clone)]
pub struct HttpCatalogService {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogService {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    async fn fetch(&self) -> Result<Catalog> {
        debug!(url = %self.url, "fetching catalog");
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipeflowError::Catalog(format!("catalog request to {} failed with status {}", self.url, status)));
        }

        let body = response.text().await?;
        Catalog::from_json(&body)
    }
}
