// file: src/utils/http.rs
// description: shared reqwest client construction with per-call timeouts

use crate::error::{PipelineError, Result};
use reqwest::Client;
use std::time::Duration;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builds a client whose every request is bounded by `timeout`.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| PipelineError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Describes a reqwest failure with the cause chain flattened into one line.
pub fn describe_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return "request timed out".to_string();
    }

    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
