// file: src/publisher/s3.rs
// description: Amazon S3 object store over the AWS SDK
// reference: https://docs.rs/aws-sdk-s3

use crate::config::StoreConfig;
use crate::error::PublishFailure;
use crate::publisher::store::{ObjectStore, PutObject, StoredObject};
use crate::utils::Validator;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::timeout::TimeoutConfig;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStream;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct ClientSettings {
    region: Option<String>,
    endpoint: Option<String>,
    timeout: Duration,
}

/// Writes objects with S3 `PutObject`. Credentials and region come from the
/// standard AWS chain (environment, shared profile, instance role) and are
/// resolved on the first upload.
#[derive(Debug)]
pub struct S3ObjectStore {
    bucket: String,
    settings: ClientSettings,
    client: OnceCell<Client>,
}

impl S3ObjectStore {
    pub fn new(config: &StoreConfig, bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            settings: ClientSettings {
                region: Validator::non_blank(config.region.as_deref()),
                endpoint: Validator::non_blank(config.endpoint.as_deref()),
                timeout: Duration::from_secs(config.timeout_secs),
            },
            client: OnceCell::new(),
        }
    }

    /// Uses an already configured client as-is.
    pub fn with_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            settings: ClientSettings {
                region: None,
                endpoint: None,
                timeout: Duration::ZERO,
            },
            client: OnceCell::from(client),
        }
    }

    async fn client(&self) -> Result<&Client, PublishFailure> {
        self.client.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<Client, PublishFailure> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(self.settings.timeout)
                .build(),
        );
        if let Some(region) = &self.settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        ensure_credentials(shared.credentials_provider()).await?;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &self.settings.endpoint {
            debug!("Using S3 endpoint override {}", endpoint);
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Ok(Client::from_conf(builder.build()))
    }

    fn classify(&self, err: &SdkError<PutObjectError, HttpResponse>) -> PublishFailure {
        match err.raw_response() {
            Some(response) => classify_response(
                &self.bucket,
                err.code(),
                response.status().as_u16(),
                err.message().unwrap_or_default(),
            ),
            None => PublishFailure::Transport(DisplayErrorContext(err).to_string()),
        }
    }
}

/// Fails with `MissingCredentials` when the provider chain yields nothing.
async fn ensure_credentials(
    provider: Option<SharedCredentialsProvider>,
) -> Result<(), PublishFailure> {
    let provider = provider.ok_or(PublishFailure::MissingCredentials)?;
    provider.provide_credentials().await.map(|_| ()).map_err(|e| {
        warn!("No AWS credentials available: {}", DisplayErrorContext(&e));
        PublishFailure::MissingCredentials
    })
}

fn classify_response(bucket: &str, code: Option<&str>, status: u16, message: &str) -> PublishFailure {
    match (code, status) {
        (
            Some("AccessDenied" | "AllAccessDisabled" | "InvalidAccessKeyId" | "SignatureDoesNotMatch"),
            _,
        )
        | (_, 401 | 403) => PublishFailure::AccessDenied {
            bucket: bucket.to_string(),
        },
        (Some("NoSuchBucket"), _) | (None, 404) => PublishFailure::BucketNotFound {
            bucket: bucket.to_string(),
        },
        _ => PublishFailure::Rejected {
            status,
            body: Validator::truncate_text(
                &format!("{}: {}", code.unwrap_or("Unknown"), message),
                200,
            ),
        },
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(&self, request: PutObject) -> Result<StoredObject, PublishFailure> {
        let client = self.client().await?;
        debug!(
            "PutObject s3://{}/{} ({} bytes)",
            self.bucket,
            request.key,
            request.body.len()
        );

        let metadata: HashMap<String, String> = request.metadata.into_iter().collect();
        let output = client
            .put_object()
            .bucket(&self.bucket)
            .key(&request.key)
            .content_type(&request.content_type)
            .set_metadata(Some(metadata))
            .body(ByteStream::from(request.body))
            .send()
            .await
            .map_err(|err| self.classify(&err))?;

        Ok(StoredObject {
            bucket: self.bucket.clone(),
            key: request.key,
            etag: output.e_tag().map(|tag| tag.trim_matches('"').to_string()),
        })
    }
}
