// file: src/publisher/http.rs
// description: bearer-token object store gateway over reqwest

use crate::config::StoreConfig;
use crate::error::{PipelineError, PublishFailure, Result};
use crate::publisher::store::{ObjectStore, PutObject, StoredObject};
use crate::utils::Validator;
use crate::utils::http::{build_client, describe_error};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, ETAG};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

const METADATA_HEADER_PREFIX: &str = "x-amz-meta-";

/// Uploads to an S3-compatible gateway with `PUT {endpoint}/{bucket}/{key}`,
/// user metadata as `x-amz-meta-*` headers and a bearer access token. The
/// request is not SigV4-signed; use `S3ObjectStore` for Amazon S3.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    bucket: String,
    access_token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(config: &StoreConfig, bucket: impl Into<String>) -> Result<Self> {
        let endpoint = Validator::non_blank(config.endpoint.as_deref()).ok_or_else(|| {
            PipelineError::Config("store.endpoint is required for the http backend".to_string())
        })?;
        let client = build_client(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::with_client(
            client,
            endpoint,
            bucket,
            config.access_token.clone(),
        ))
    }

    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_token: Validator::non_blank(access_token.as_deref()),
        }
    }

    pub fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.bucket,
            key.trim_start_matches('/')
        )
    }

    fn classify(&self, status: StatusCode, body: String) -> PublishFailure {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PublishFailure::AccessDenied {
                bucket: self.bucket.clone(),
            },
            StatusCode::NOT_FOUND => PublishFailure::BucketNotFound {
                bucket: self.bucket.clone(),
            },
            _ => PublishFailure::Rejected {
                status: status.as_u16(),
                body: Validator::truncate_text(body.trim(), 200),
            },
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(
        &self,
        request: PutObject,
    ) -> std::result::Result<StoredObject, PublishFailure> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(PublishFailure::MissingCredentials)?;

        let url = self.object_url(&request.key);
        debug!("PUT {} ({} bytes)", url, request.body.len());

        let mut builder = self
            .client
            .put(&url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, request.content_type.as_str());
        for (name, value) in &request.metadata {
            builder = builder.header(format!("{}{}", METADATA_HEADER_PREFIX, name), value);
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| PublishFailure::Transport(describe_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.classify(status, body));
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim_matches('"').to_string());

        Ok(StoredObject {
            bucket: self.bucket.clone(),
            key: request.key,
            etag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer, token: Option<&str>) -> HttpObjectStore {
        HttpObjectStore::with_client(
            Client::new(),
            server.uri(),
            "product-data",
            token.map(str::to_string),
        )
    }

    fn request() -> PutObject {
        let mut metadata = BTreeMap::new();
        metadata.insert("product-count".to_string(), "2".to_string());
        metadata.insert("processor".to_string(), "catalog-publisher".to_string());
        PutObject {
            key: "filtered_products.json".to_string(),
            body: b"[]".to_vec(),
            content_type: "application/json".to_string(),
            metadata,
        }
    }

    #[tokio::test]
    async fn test_put_sends_metadata_headers() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/product-data/filtered_products.json"))
            .and(header("authorization", "Bearer secret"))
            .and(header("content-type", "application/json"))
            .and(header("x-amz-meta-product-count", "2"))
            .and(header("x-amz-meta-processor", "catalog-publisher"))
            .and(body_string("[]"))
            .respond_with(ResponseTemplate::new(200).insert_header("etag", "\"abc123\""))
            .expect(1)
            .mount(&server)
            .await;

        let stored = store(&server, Some("secret"))
            .put_object(request())
            .await
            .unwrap();

        assert_eq!(stored.bucket, "product-data");
        assert_eq!(stored.etag.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_missing_credentials_never_sends() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = store(&server, None).put_object(request()).await.unwrap_err();
        assert_eq!(err, PublishFailure::MissingCredentials);
    }

    #[tokio::test]
    async fn test_status_classification() {
        let cases = [
            (403u16, PublishFailure::AccessDenied { bucket: "product-data".to_string() }),
            (404, PublishFailure::BucketNotFound { bucket: "product-data".to_string() }),
            (
                500,
                PublishFailure::Rejected {
                    status: 500,
                    body: "internal".to_string(),
                },
            ),
        ];

        for (status, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("PUT"))
                .respond_with(ResponseTemplate::new(status).set_body_string("internal"))
                .mount(&server)
                .await;

            let err = store(&server, Some("secret"))
                .put_object(request())
                .await
                .unwrap_err();
            assert_eq!(err, expected);
        }
    }

    #[test]
    fn test_object_url_normalizes_slashes() {
        let store = HttpObjectStore::with_client(
            Client::new(),
            "https://s3.example.com/",
            "bucket-a",
            None,
        );
        assert_eq!(
            store.object_url("filtered_products.json"),
            "https://s3.example.com/bucket-a/filtered_products.json"
        );
    }
}
