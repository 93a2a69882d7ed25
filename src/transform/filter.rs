// file: src/transform/filter.rs
// description: price threshold filter producing derived pricing entries

use crate::error::{PipelineError, Result};
use crate::models::{Catalog, FilteredCatalog, FilteredEntry};
use crate::utils::Validator;
use tracing::{debug, info, warn};

pub const DEFAULT_MIN_PRICE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceFilter {
    threshold: f64,
}

impl Default for PriceFilter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MIN_PRICE,
        }
    }
}

impl PriceFilter {
    pub fn new(threshold: f64) -> Result<Self> {
        Validator::validate_threshold(threshold)?;
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Keeps entries priced at or above the threshold, in source order.
    pub fn apply(&self, catalog: &Catalog) -> FilteredCatalog {
        info!("Filtering products with price >= {}", self.threshold);

        if catalog.is_empty() {
            warn!("No products found in the catalog");
            return FilteredCatalog::default();
        }

        let filtered = filter_catalog(catalog, self.threshold);
        debug!(
            "{} of {} products passed the price filter",
            filtered.len(),
            catalog.len()
        );
        filtered
    }

    /// Like [`PriceFilter::apply`], but an empty result is an error.
    pub fn apply_non_empty(&self, catalog: &Catalog) -> Result<FilteredCatalog> {
        let filtered = self.apply(catalog);
        if filtered.is_empty() {
            return Err(PipelineError::EmptyResult {
                threshold: self.threshold,
            });
        }
        Ok(filtered)
    }
}

pub fn filter_catalog(catalog: &Catalog, threshold: f64) -> FilteredCatalog {
    FilteredCatalog::new(
        catalog
            .products
            .iter()
            .filter(|entry| entry.price >= threshold)
            .map(FilteredEntry::derive)
            .collect(),
    )
}
