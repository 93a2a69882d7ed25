// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use crate::pipeline::Stage;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Process exit status for a run that failed inside the pipeline.
pub const EXIT_PIPELINE_FAILURE: i32 = 1;
/// Process exit status for a run rejected before any stage started.
/// `EX_CONFIG` from sysexits(3), kept apart from clap's usage error status 2.
pub const EXIT_CONFIGURATION: i32 = 78;
/// Status clap exits with on malformed command lines.
pub const EXIT_USAGE: i32 = 2;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch from {url} failed: {message}")]
    Fetch { url: String, message: String },

    #[error("No products matched price >= {threshold}")]
    EmptyResult { threshold: f64 },

    #[error("Publish of {key} failed: {source}")]
    Publish {
        key: String,
        #[source]
        source: PublishFailure,
    },

    #[error("Verification of {url} failed: {message}")]
    Verify { url: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons an object store refused or failed to accept an upload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishFailure {
    #[error("storage credentials not found")]
    MissingCredentials,

    #[error("access denied to bucket {bucket}")]
    AccessDenied { bucket: String },

    #[error("bucket {bucket} not found")]
    BucketNotFound { bucket: String },

    #[error("store rejected upload with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl PipelineError {
    /// The pipeline stage the error belongs to, `None` for errors raised
    /// before the pipeline started.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Config(_) => None,
            PipelineError::Fetch { .. } => Some(Stage::Fetching),
            PipelineError::EmptyResult { .. } => Some(Stage::Filtering),
            PipelineError::Publish { .. } | PipelineError::Serialization(_) => {
                Some(Stage::Publishing)
            }
            PipelineError::Verify { .. } => Some(Stage::Verifying),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => EXIT_CONFIGURATION,
            _ => EXIT_PIPELINE_FAILURE,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, PipelineError::Config(_))
    }
}
