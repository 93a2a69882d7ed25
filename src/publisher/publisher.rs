// file: src/publisher/publisher.rs
// description: serializes the filtered catalog and writes it to the object store

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{PipelineError, Result};
use crate::models::FilteredCatalog;
use crate::publisher::filesystem::FilesystemStore;
use crate::publisher::http::HttpObjectStore;
use crate::publisher::s3::S3ObjectStore;
use crate::publisher::store::{
    METADATA_PROCESSOR, METADATA_PRODUCT_COUNT, ObjectStore, PutObject,
};
use crate::utils::sha256_hex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Well-known key the artifact is always written to and read from.
pub const ARTIFACT_KEY: &str = "filtered_products.json";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Acknowledgement of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishAck {
    pub bucket: String,
    pub key: String,
    pub product_count: usize,
    pub bytes: usize,
    pub sha256: String,
    pub etag: Option<String>,
}

pub struct Publisher {
    store: Box<dyn ObjectStore>,
    processor: String,
}

impl Publisher {
    pub fn new(store: Box<dyn ObjectStore>, processor: impl Into<String>) -> Self {
        Self {
            store,
            processor: processor.into(),
        }
    }

    /// Picks the store backend named in the configuration.
    pub fn from_config(config: &StoreConfig, bucket: &str) -> Result<Self> {
        let store: Box<dyn ObjectStore> = match config.backend {
            StoreBackend::S3 => Box::new(S3ObjectStore::new(config, bucket)),
            StoreBackend::Http => Box::new(HttpObjectStore::new(config, bucket)?),
            StoreBackend::Filesystem => Box::new(FilesystemStore::new(&config.root, bucket)),
        };
        Ok(Self::new(store, config.processor.clone()))
    }

    pub fn bucket(&self) -> &str {
        self.store.bucket()
    }

    /// Creates or overwrites the artifact. Store failures are returned as-is;
    /// nothing is retried.
    pub async fn publish(&self, catalog: &FilteredCatalog) -> Result<PublishAck> {
        info!(
            "Uploading {} products to bucket {}",
            catalog.len(),
            self.store.bucket()
        );

        let body = catalog.to_json_pretty()?.into_bytes();
        let bytes = body.len();
        let sha256 = sha256_hex(&body);

        let mut metadata = BTreeMap::new();
        metadata.insert(METADATA_PRODUCT_COUNT.to_string(), catalog.len().to_string());
        metadata.insert(METADATA_PROCESSOR.to_string(), self.processor.clone());

        let stored = self
            .store
            .put_object(PutObject {
                key: ARTIFACT_KEY.to_string(),
                body,
                content_type: CONTENT_TYPE_JSON.to_string(),
                metadata,
            })
            .await
            .map_err(|source| PipelineError::Publish {
                key: ARTIFACT_KEY.to_string(),
                source,
            })?;

        info!("Successfully uploaded {} ({} bytes)", stored.key, bytes);

        Ok(PublishAck {
            bucket: stored.bucket,
            key: stored.key,
            product_count: catalog.len(),
            bytes,
            sha256,
            etag: stored.etag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublishFailure;
    use crate::models::{Catalog, CatalogEntry};
    use crate::publisher::store::MemoryStore;
    use crate::transform::filter_catalog;
    use std::sync::Arc;

    fn filtered() -> FilteredCatalog {
        filter_catalog(
            &Catalog::new(vec![
                CatalogEntry::new(1, "Phone", 549.0).with_stock(94),
                CatalogEntry::new(2, "Cable", 9.0),
                CatalogEntry::new(3, "Laptop", 1749.0).with_discount(4.15),
            ]),
            100.0,
        )
    }

    #[tokio::test]
    async fn test_publish_writes_well_known_key_with_metadata() {
        let memory = Arc::new(MemoryStore::new("product-data"));
        let publisher = Publisher::new(Box::new(memory.clone()), "catalog-publisher");
        let catalog = filtered();

        let ack = publisher.publish(&catalog).await.unwrap();

        let object = memory.get(ARTIFACT_KEY).unwrap();
        assert_eq!(object.content_type, "application/json");
        assert_eq!(object.metadata["product-count"], "2");
        assert_eq!(object.metadata["processor"], "catalog-publisher");
        assert_eq!(object.body, catalog.to_json_pretty().unwrap().into_bytes());

        assert_eq!(ack.key, ARTIFACT_KEY);
        assert_eq!(ack.bucket, "product-data");
        assert_eq!(ack.product_count, 2);
        assert_eq!(ack.bytes, object.body.len());
        assert_eq!(ack.sha256, sha256_hex(&object.body));
    }

    #[tokio::test]
    async fn test_publish_surfaces_store_rejection() {
        let root = tempfile::TempDir::new().unwrap();
        let publisher = Publisher::new(
            Box::new(FilesystemStore::new(root.path(), "no-such-bucket")),
            "catalog-publisher",
        );

        let err = publisher.publish(&filtered()).await.unwrap_err();

        match err {
            PipelineError::Publish { key, source } => {
                assert_eq!(key, ARTIFACT_KEY);
                assert!(matches!(source, PublishFailure::BucketNotFound { .. }));
            }
            other => panic!("expected publish error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_config_selects_backend() {
        let config = StoreConfig {
            backend: StoreBackend::Filesystem,
            ..StoreConfig::default()
        };
        let publisher = Publisher::from_config(&config, "local-bucket").unwrap();
        assert_eq!(publisher.bucket(), "local-bucket");

        let publisher = Publisher::from_config(&StoreConfig::default(), "product-data").unwrap();
        assert_eq!(publisher.bucket(), "product-data");

        let gateway = StoreConfig {
            backend: StoreBackend::Http,
            endpoint: None,
            ..StoreConfig::default()
        };
        assert!(Publisher::from_config(&gateway, "product-data").is_err());
    }
}
