// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns

//! Fetches a product catalog, keeps the products priced at or above a
//! threshold, publishes them as `filtered_products.json` to an object store and
//! reads the artifact back through its distribution endpoint.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod publisher;
pub mod source;
pub mod transform;
pub mod utils;
pub mod verifier;

pub use config::{Config, DistributionConfig, FilterConfig, Overrides, SourceConfig, StoreBackend, StoreConfig};
pub use error::{PipelineError, PublishFailure, Result};
pub use models::{Catalog, CatalogEntry, FilteredCatalog, FilteredEntry};
pub use pipeline::{
    Narration, NarrationKind, PipelineOrchestrator, PipelineOutcome, PipelineStats, Stage,
};
pub use publisher::{
    ARTIFACT_KEY, FilesystemStore, HttpObjectStore, MemoryStore, ObjectStore, PublishAck,
    Publisher, S3ObjectStore,
};
pub use source::CatalogFetcher;
pub use transform::{DEFAULT_MIN_PRICE, PriceFilter, filter_catalog};
pub use utils::Validator;
pub use verifier::{ArtifactVerifier, VerificationReport};
