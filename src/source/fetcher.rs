// file: src/source/fetcher.rs
// description: downloads the product catalog from the source endpoint

use crate::config::SourceConfig;
use crate::error::{PipelineError, Result};
use crate::models::Catalog;
use crate::utils::http::{build_client, describe_error};
use crate::utils::Validator;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct CatalogFetcher {
    client: Client,
    url: String,
}

impl CatalogFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = build_client(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::with_client(client, config.url.clone()))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Single GET, no retries. Transport errors, non-2xx statuses and bodies
    /// that are not a catalog document all surface as `PipelineError::Fetch`.
    pub async fn fetch(&self) -> Result<Catalog> {
        info!("Downloading product data from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.error(describe_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.error(format!(
                "unexpected status {}: {}",
                status,
                Validator::truncate_text(body.trim(), 200)
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.error(describe_error(&e)))?;
        debug!("Received {} bytes from catalog source", bytes.len());

        let catalog: Catalog = serde_json::from_slice(&bytes)
            .map_err(|e| self.error(format!("malformed catalog body: {}", e)))?;

        info!("Successfully downloaded {} products", catalog.len());
        Ok(catalog)
    }

    fn error(&self, message: String) -> PipelineError {
        PipelineError::Fetch {
            url: self.url.clone(),
            message,
        }
    }
}
