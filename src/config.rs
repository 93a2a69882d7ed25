// file: src/config.rs
// description: application configuration management with toml and environment support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::transform::DEFAULT_MIN_PRICE;
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "CATALOG_PUBLISHER";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const DEFAULT_SOURCE_URL: &str = "https://dummyjson.com/products";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROCESSOR: &str = "catalog-publisher";

/// Unprefixed variables accepted for the two required settings.
pub const LEGACY_ENV_KEYS: [(&str, &str); 2] = [
    ("store.bucket", "S3_BUCKET_NAME"),
    ("distribution.base_url", "CLOUDFRONT_URL"),
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub filter: FilterConfig,
    pub store: StoreConfig,
    pub distribution: DistributionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Amazon S3 through the AWS SDK and its default credential chain.
    #[default]
    S3,
    /// Generic S3-compatible gateway accepting a bearer token.
    Http,
    Filesystem,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub bucket: Option<String>,
    /// AWS region for the `s3` backend; the SDK's region chain applies when unset.
    pub region: Option<String>,
    /// Gateway base URL. Required by `http`; for `s3` it replaces the AWS
    /// endpoint and switches to path-style addressing.
    pub endpoint: Option<String>,
    /// Bearer token for the `http` backend.
    pub access_token: Option<String>,
    /// Directory holding one sub-directory per bucket, used by the `filesystem` backend.
    pub root: PathBuf,
    pub processor: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DistributionConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_price: DEFAULT_MIN_PRICE,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::S3,
            bucket: None,
            region: None,
            endpoint: None,
            access_token: None,
            root: PathBuf::from("./data/store"),
            processor: DEFAULT_PROCESSOR.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Command-line values; they take precedence over every configuration layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bucket: Option<String>,
    pub distribution_url: Option<String>,
    pub min_price: Option<f64>,
    pub source_url: Option<String>,
}

impl Config {
    /// Layers built-in defaults, a TOML file, `CATALOG_PUBLISHER__*`
    /// environment variables and finally `S3_BUCKET_NAME` / `CLOUDFRONT_URL`.
    /// An explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false)),
        };

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        for (key, var) in LEGACY_ENV_KEYS {
            let value = Validator::non_blank(std::env::var(var).ok().as_deref());
            builder = builder
                .set_override_option(key, value)
                .map_err(|e| PipelineError::Config(e.to_string()))?;
        }

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(bucket) = Validator::non_blank(overrides.bucket.as_deref()) {
            self.store.bucket = Some(bucket);
        }
        if let Some(url) = Validator::non_blank(overrides.distribution_url.as_deref()) {
            self.distribution.base_url = Some(url);
        }
        if let Some(url) = Validator::non_blank(overrides.source_url.as_deref()) {
            self.source.url = url;
        }
        if let Some(min_price) = overrides.min_price {
            self.filter.min_price = min_price;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        Validator::validate_url(&self.source.url)?;
        Validator::validate_threshold(self.filter.min_price)?;
        Validator::validate_timeout("source.timeout_secs", self.source.timeout_secs)?;
        Validator::validate_timeout("store.timeout_secs", self.store.timeout_secs)?;
        Validator::validate_timeout(
            "distribution.timeout_secs",
            self.distribution.timeout_secs,
        )?;

        match Validator::non_blank(self.store.endpoint.as_deref()) {
            Some(endpoint) => Validator::validate_url(&endpoint)?,
            None if self.store.backend == StoreBackend::Http => {
                return Err(PipelineError::Config(
                    "store.endpoint is required for the http backend".to_string(),
                ));
            }
            None => {}
        }
        if let Some(bucket) = Validator::non_blank(self.store.bucket.as_deref()) {
            Validator::validate_bucket_name(&bucket)?;
        }
        if let Some(url) = Validator::non_blank(self.distribution.base_url.as_deref()) {
            Validator::validate_url(&url)?;
        }

        Ok(())
    }

    /// The destination bucket; required before publishing.
    pub fn require_bucket(&self) -> Result<String> {
        Validator::non_blank(self.store.bucket.as_deref()).ok_or_else(|| {
            PipelineError::Config(
                "store bucket is required (set S3_BUCKET_NAME, --bucket or store.bucket)".to_string(),
            )
        })
    }

    /// The distribution base URL; required before verifying.
    pub fn require_distribution_url(&self) -> Result<String> {
        Validator::non_blank(self.distribution.base_url.as_deref()).ok_or_else(|| {
            PipelineError::Config(
                "distribution base URL is required (set CLOUDFRONT_URL, --distribution-url or distribution.base_url)"
                    .to_string(),
            )
        })
    }
}
