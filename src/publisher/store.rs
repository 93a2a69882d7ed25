// file: src/publisher/store.rs
// description: object store abstraction used by the publisher

use crate::error::PublishFailure;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub const METADATA_PRODUCT_COUNT: &str = "product-count";
pub const METADATA_PROCESSOR: &str = "processor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub metadata: BTreeMap<String, String>,
}

/// What the store reports back after accepting an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub etag: Option<String>,
}

/// Destination for the published artifact. Writes create or overwrite.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn bucket(&self) -> &str;

    async fn put_object(&self, request: PutObject) -> Result<StoredObject, PublishFailure>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    fn bucket(&self) -> &str {
        (**self).bucket()
    }

    async fn put_object(&self, request: PutObject) -> Result<StoredObject, PublishFailure> {
        (**self).put_object(request).await
    }
}

/// Keeps uploaded objects in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bucket: String,
    objects: Mutex<BTreeMap<String, PutObject>>,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<PutObject> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(&self, request: PutObject) -> Result<StoredObject, PublishFailure> {
        let key = request.key.clone();
        self.objects
            .lock()
            .map_err(|_| PublishFailure::Transport("memory store lock poisoned".to_string()))?
            .insert(key.clone(), request);

        Ok(StoredObject {
            bucket: self.bucket.clone(),
            key,
            etag: None,
        })
    }
}
