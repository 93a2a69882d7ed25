// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod catalog;
pub mod filtered;

pub use catalog::{Catalog, CatalogEntry};
pub use filtered::{FilteredCatalog, FilteredEntry};
