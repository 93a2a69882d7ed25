// file: src/verifier/mod.rs
// description: distribution round-trip verification exports

mod artifact;

pub use artifact::{ArtifactVerifier, VerificationReport, artifact_url};
