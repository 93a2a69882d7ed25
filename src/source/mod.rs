// file: src/source/mod.rs
// description: catalog source module exports

mod fetcher;

pub use fetcher::CatalogFetcher;
