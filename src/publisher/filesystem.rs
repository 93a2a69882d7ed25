// file: src/publisher/filesystem.rs
// description: directory-backed object store for local runs

use crate::error::PublishFailure;
use crate::publisher::store::{ObjectStore, PutObject, StoredObject};
use crate::utils::sha256_hex;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores `{root}/{bucket}/{key}` with a `{key}.metadata.json` sidecar.
/// The bucket directory must already exist.
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    root: PathBuf,
    bucket: String,
}

#[derive(Debug, Serialize)]
struct Sidecar<'a> {
    content_type: &'a str,
    metadata: &'a BTreeMap<String, String>,
    sha256: String,
}

impl FilesystemStore {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
        }
    }

    pub fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    pub fn object_path(&self, key: &str) -> PathBuf {
        self.bucket_dir().join(key)
    }

    fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".metadata.json");
        path.with_file_name(name)
    }
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(&self, request: PutObject) -> Result<StoredObject, PublishFailure> {
        let bucket_dir = self.bucket_dir();
        if !tokio::fs::try_exists(&bucket_dir).await.unwrap_or(false) {
            return Err(PublishFailure::BucketNotFound {
                bucket: self.bucket.clone(),
            });
        }

        let path = self.object_path(&request.key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_failure(&self.bucket, e))?;
        }

        let sha256 = sha256_hex(&request.body);
        let sidecar = serde_json::to_vec_pretty(&Sidecar {
            content_type: &request.content_type,
            metadata: &request.metadata,
            sha256: sha256.clone(),
        })
        .map_err(|e| PublishFailure::Transport(e.to_string()))?;

        tokio::fs::write(&path, &request.body)
            .await
            .map_err(|e| io_failure(&self.bucket, e))?;
        tokio::fs::write(Self::sidecar_path(&path), sidecar)
            .await
            .map_err(|e| io_failure(&self.bucket, e))?;

        debug!("Wrote {} ({} bytes)", path.display(), request.body.len());

        Ok(StoredObject {
            bucket: self.bucket.clone(),
            key: request.key,
            etag: Some(sha256),
        })
    }
}

fn io_failure(bucket: &str, err: std::io::Error) -> PublishFailure {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => PublishFailure::AccessDenied {
            bucket: bucket.to_string(),
        },
        _ => PublishFailure::Transport(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn request() -> PutObject {
        let mut metadata = BTreeMap::new();
        metadata.insert("product-count".to_string(), "1".to_string());
        PutObject {
            key: "filtered_products.json".to_string(),
            body: b"[{\"id\": 1}]".to_vec(),
            content_type: "application/json".to_string(),
            metadata,
        }
    }

    #[tokio::test]
    async fn test_writes_object_and_sidecar() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("local-bucket")).unwrap();
        let store = FilesystemStore::new(root.path(), "local-bucket");

        let stored = store.put_object(request()).await.unwrap();

        let path = store.object_path("filtered_products.json");
        assert_eq!(fs::read(&path).unwrap(), b"[{\"id\": 1}]");
        assert_eq!(stored.etag, Some(sha256_hex(b"[{\"id\": 1}]")));

        let sidecar: serde_json::Value = serde_json::from_slice(
            &fs::read(root.path().join("local-bucket/filtered_products.json.metadata.json"))
                .unwrap(),
        )
        .unwrap();
        assert_eq!(sidecar["metadata"]["product-count"], "1");
        assert_eq!(sidecar["content_type"], "application/json");
    }

    #[tokio::test]
    async fn test_missing_bucket_directory() {
        let root = TempDir::new().unwrap();
        let store = FilesystemStore::new(root.path(), "absent-bucket");

        let err = store.put_object(request()).await.unwrap_err();
        assert_eq!(
            err,
            PublishFailure::BucketNotFound {
                bucket: "absent-bucket".to_string()
            }
        );
    }
}
