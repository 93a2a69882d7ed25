// file: src/publisher/mod.rs
// description: artifact publishing and object store backends

mod filesystem;
mod http;
#[allow(clippy::module_inception)]
mod publisher;
mod s3;
mod store;

pub use filesystem::FilesystemStore;
pub use http::HttpObjectStore;
pub use publisher::{ARTIFACT_KEY, CONTENT_TYPE_JSON, PublishAck, Publisher};
pub use s3::S3ObjectStore;
pub use store::{
    METADATA_PROCESSOR, METADATA_PRODUCT_COUNT, MemoryStore, ObjectStore, PutObject, StoredObject,
};
