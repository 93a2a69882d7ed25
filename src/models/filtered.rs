// file: src/models/filtered.rs
// description: published product shape with derived pricing fields

use crate::models::catalog::{Catalog, CatalogEntry};
use serde::Serialize;

/// A catalog product that passed the price filter.
///
/// `total` and `discounted_price` are computed from the source entry and have
/// no setters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredEntry {
    id: Option<i64>,
    title: Option<String>,
    price: f64,
    quantity: u64,
    total: f64,
    discount_percentage: f64,
    discounted_price: f64,
    thumbnail: Option<String>,
}

impl FilteredEntry {
    pub fn derive(entry: &CatalogEntry) -> Self {
        let quantity = entry.stock;
        Self {
            id: entry.id,
            title: entry.title.clone(),
            price: entry.price,
            quantity,
            total: entry.price * quantity as f64,
            discount_percentage: entry.discount_percentage,
            discounted_price: entry.price * (1.0 - entry.discount_percentage / 100.0),
            thumbnail: entry.thumbnail.clone(),
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn discount_percentage(&self) -> f64 {
        self.discount_percentage
    }

    pub fn discounted_price(&self) -> f64 {
        self.discounted_price
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }
}

impl From<&FilteredEntry> for CatalogEntry {
    fn from(entry: &FilteredEntry) -> Self {
        CatalogEntry {
            id: entry.id,
            title: entry.title.clone(),
            price: entry.price,
            stock: entry.quantity,
            discount_percentage: entry.discount_percentage,
            thumbnail: entry.thumbnail.clone(),
        }
    }
}

/// Ordered output of the price filter, serialized as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilteredCatalog {
    entries: Vec<FilteredEntry>,
}

impl FilteredCatalog {
    pub fn new(entries: Vec<FilteredEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&FilteredEntry> {
        self.entries.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilteredEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[FilteredEntry] {
        &self.entries
    }

    /// Pretty-printed UTF-8 JSON document, two-space indented, non-ASCII
    /// characters kept as-is.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }

    /// Rebuilds the catalog these entries would have been filtered from.
    pub fn to_catalog(&self) -> Catalog {
        Catalog::new(self.entries.iter().map(CatalogEntry::from).collect())
    }
}

impl<'a> IntoIterator for &'a FilteredCatalog {
    type Item = &'a FilteredEntry;
    type IntoIter = std::slice::Iter<'a, FilteredEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_derived_fields() {
        let source = CatalogEntry::new(2, "Expensive Product", 150.0)
            .with_stock(5)
            .with_discount(5.0);
        let entry = FilteredEntry::derive(&source);

        assert_eq!(entry.quantity(), 5);
        assert_eq!(entry.total(), 750.0);
        assert!((entry.discounted_price() - 142.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_discount_keeps_price() {
        let entry = FilteredEntry::derive(&CatalogEntry::new(3, "Plain", 100.0));
        assert_eq!(entry.discounted_price(), entry.price());
        assert_eq!(entry.total(), 100.0);
    }

    #[test]
    fn test_serialized_field_names() {
        let source = CatalogEntry::new(1, "Lamp", 120.0)
            .with_stock(2)
            .with_discount(50.0)
            .with_thumbnail("https://example.com/lamp.jpg");
        let value = serde_json::to_value(FilteredEntry::derive(&source)).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 1,
                "title": "Lamp",
                "price": 120.0,
                "quantity": 2,
                "total": 240.0,
                "discountPercentage": 50.0,
                "discountedPrice": 60.0,
                "thumbnail": "https://example.com/lamp.jpg"
            })
        );
    }

    #[test]
    fn test_json_document_preserves_non_ascii() {
        let catalog = FilteredCatalog::new(vec![FilteredEntry::derive(&CatalogEntry::new(
            9,
            "Crème brûlée torch",
            110.0,
        ))]);
        let json = catalog.to_json_pretty().unwrap();

        assert!(json.starts_with("[\n  {\n    \"id\": 9,"));
        assert!(json.contains("Crème brûlée torch"));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn test_empty_catalog_serializes_to_empty_array() {
        assert_eq!(FilteredCatalog::default().to_json_pretty().unwrap(), "[]");
    }
}
