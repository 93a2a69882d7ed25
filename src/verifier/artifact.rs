// file: src/verifier/artifact.rs
// description: fetches the published artifact through the distribution endpoint

use crate::config::DistributionConfig;
use crate::error::{PipelineError, Result};
use crate::publisher::{ARTIFACT_KEY, PublishAck};
use crate::utils::http::{build_client, describe_error};
use crate::utils::{Validator, sha256_hex};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

/// Outcome of a successful artifact round trip.
///
/// Only the array shape is checked; entries are carried as untyped JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub url: String,
    pub entry_count: usize,
    pub first_entry: Option<Value>,
    pub sha256: String,
    pub verified_at: DateTime<Utc>,
}

impl VerificationReport {
    /// Compares what the distribution served with what was uploaded and
    /// returns a description of every difference.
    pub fn discrepancies(&self, ack: &PublishAck) -> Vec<String> {
        let mut found = Vec::new();
        if self.entry_count != ack.product_count {
            found.push(format!(
                "distribution serves {} entries, {} were published",
                self.entry_count, ack.product_count
            ));
        }
        if self.sha256 != ack.sha256 {
            found.push("distribution content digest differs from the upload".to_string());
        }
        found
    }
}

pub fn artifact_url(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), ARTIFACT_KEY)
}

#[derive(Debug, Clone)]
pub struct ArtifactVerifier {
    client: Client,
    url: String,
}

impl ArtifactVerifier {
    pub fn new(config: &DistributionConfig, base_url: &str) -> Result<Self> {
        let client = build_client(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: artifact_url(base_url),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn verify(&self) -> Result<VerificationReport> {
        info!("Downloading artifact from distribution: {}", self.url);

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

        let entries: Vec<Value> = serde_json::from_slice(&bytes)
            .map_err(|e| self.error(format!("artifact is not a valid JSON array: {}", e)))?;

        if entries.is_empty() {
            warn!("Artifact at {} contains no entries", self.url);
        }

        let report = VerificationReport {
            url: self.url.clone(),
            entry_count: entries.len(),
            first_entry: entries.into_iter().next(),
            sha256: sha256_hex(&bytes),
            verified_at: Utc::now(),
        };

        info!(
            "Downloaded and validated JSON: {} products",
            report.entry_count
        );
        Ok(report)
    }

    fn error(&self, message: String) -> PipelineError {
        PipelineError::Verify {
            url: self.url.clone(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_artifact_url_normalizes_trailing_slash() {
        assert_eq!(
            artifact_url("https://d111.cloudfront.net/"),
            "https://d111.cloudfront.net/filtered_products.json"
        );
        assert_eq!(
            artifact_url("https://d111.cloudfront.net"),
            "https://d111.cloudfront.net/filtered_products.json"
        );
        assert_eq!(
            artifact_url("https://cdn.example.com/catalog//"),
            "https://cdn.example.com/catalog/filtered_products.json"
        );
    }

    #[tokio::test]
    async fn test_verify_reports_count_and_first_entry() {
        let server = MockServer::start().await;
        let body = r#"[
  {"id": 2, "title": "Expensive Product", "price": 150.0},
  {"id": 3, "title": "Exactly 100 Product", "price": 100.0}
]"#;
        Mock::given(method("GET"))
            .and(path("/filtered_products.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let verifier = ArtifactVerifier::with_client(Client::new(), &format!("{}/", server.uri()));
        let report = verifier.verify().await.unwrap();

        assert_eq!(report.entry_count, 2);
        assert_eq!(
            report.first_entry,
            Some(json!({"id": 2, "title": "Expensive Product", "price": 150.0}))
        );
        assert_eq!(report.sha256, sha256_hex(body.as_bytes()));
    }

    #[tokio::test]
    async fn test_first_entry_keeps_published_field_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"title": "Laptop", "price": 1749.0, "id": 9, "discountedPrice": 1676.4}]"#,
            ))
            .mount(&server)
            .await;

        let report = ArtifactVerifier::with_client(Client::new(), &server.uri())
            .verify()
            .await
            .unwrap();
        let first = report.first_entry.unwrap();
        let keys: Vec<&str> = first.as_object().unwrap().keys().map(String::as_str).collect();

        assert_eq!(keys, ["title", "price", "id", "discountedPrice"]);
        assert!(
            serde_json::to_string(&first)
                .unwrap()
                .starts_with(r#"{"title":"Laptop","price":1749.0"#)
        );
    }

    #[tokio::test]
    async fn test_verify_is_loose_about_entry_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"unexpected": true}, 7]"#))
            .mount(&server)
            .await;

        let report = ArtifactVerifier::with_client(Client::new(), &server.uri())
            .verify()
            .await
            .unwrap();
        assert_eq!(report.entry_count, 2);
    }

    #[tokio::test]
    async fn test_verify_truncated_artifact() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id": 1, "title": "Tru"#))
            .mount(&server)
            .await;

        let err = ArtifactVerifier::with_client(Client::new(), &server.uri())
            .verify()
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Verify { ref message, .. } if message.contains("not a valid JSON")));
    }

    #[tokio::test]
    async fn test_verify_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("NoSuchKey"))
            .mount(&server)
            .await;

        let err = ArtifactVerifier::with_client(Client::new(), &server.uri())
            .verify()
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(crate::pipeline::Stage::Verifying));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_discrepancies() {
        let ack = PublishAck {
            bucket: "b".to_string(),
            key: ARTIFACT_KEY.to_string(),
            product_count: 3,
            bytes: 10,
            sha256: "aaa".to_string(),
            etag: None,
        };
        let report = VerificationReport {
            url: artifact_url("https://cdn.example.com"),
            entry_count: 2,
            first_entry: None,
            sha256: "bbb".to_string(),
            verified_at: Utc::now(),
        };
        assert_eq!(report.discrepancies(&ack).len(), 2);

        let matching = VerificationReport {
            entry_count: 3,
            sha256: "aaa".to_string(),
            ..report
        };
        assert!(matching.discrepancies(&ack).is_empty());
    }
}
