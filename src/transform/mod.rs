// file: src/transform/mod.rs
// description: catalog transformation module exports

mod filter;

pub use filter::{DEFAULT_MIN_PRICE, PriceFilter, filter_catalog};
