// file: src/utils/validation.rs
// description: configuration and input validation helpers
// reference: input validation patterns

use crate::error::{PipelineError, Result};

pub struct Validator;

impl Validator {
    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PipelineError::Config(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    /// S3-style bucket naming: 3-63 chars of lowercase letters, digits, `.`
    /// and `-`, starting and ending with a letter or digit.
    pub fn validate_bucket_name(bucket: &str) -> Result<()> {
        let len = bucket.len();
        if !(3..=63).contains(&len) {
            return Err(PipelineError::Config(format!(
                "Bucket name must be 3-63 characters: {}",
                bucket
            )));
        }

        let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-';
        if !bucket.chars().all(allowed) {
            return Err(PipelineError::Config(format!(
                "Bucket name contains invalid characters: {}",
                bucket
            )));
        }

        let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if !edge_ok(bucket.chars().next()) || !edge_ok(bucket.chars().last()) {
            return Err(PipelineError::Config(format!(
                "Bucket name must start and end with a letter or digit: {}",
                bucket
            )));
        }

        Ok(())
    }

    pub fn validate_threshold(threshold: f64) -> Result<()> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(PipelineError::Config(format!(
                "Price threshold must be a non-negative number, got {}",
                threshold
            )));
        }
        Ok(())
    }

    pub fn validate_timeout(name: &str, secs: u64) -> Result<()> {
        if secs == 0 {
            return Err(PipelineError::Config(format!(
                "{} must be greater than 0",
                name
            )));
        }
        Ok(())
    }

    /// Trims whitespace and treats an empty value as absent.
    pub fn non_blank(value: Option<&str>) -> Option<String> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            let cut: String = text.chars().take(max_chars).collect();
            format!("{}...", cut)
        }
    }
}
