// file: src/models/catalog.rs
// description: source catalog model with default resolution at the wire boundary
// reference: https://serde.rs/container-attrs.html#from

use serde::{Deserialize, Serialize};

pub const DEFAULT_PRICE: f64 = 0.0;
pub const DEFAULT_STOCK: u64 = 1;
pub const DEFAULT_DISCOUNT_PERCENTAGE: f64 = 0.0;

/// Catalog document as served by the source endpoint.
///
/// A missing `products` field deserializes to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(products: Vec<CatalogEntry>) -> Self {
        Self { products }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// A single catalog product with every optional pricing field resolved.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "RawCatalogEntry", rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub price: f64,
    pub stock: u64,
    pub discount_percentage: f64,
    pub thumbnail: Option<String>,
}

/// Wire shape of a product; any field may be absent or `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCatalogEntry {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    stock: Option<u64>,
    #[serde(default)]
    discount_percentage: Option<f64>,
    #[serde(default)]
    thumbnail: Option<String>,
}

impl From<RawCatalogEntry> for CatalogEntry {
    fn from(raw: RawCatalogEntry) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            price: raw.price.unwrap_or(DEFAULT_PRICE),
            stock: raw.stock.unwrap_or(DEFAULT_STOCK),
            discount_percentage: raw
                .discount_percentage
                .unwrap_or(DEFAULT_DISCOUNT_PERCENTAGE),
            thumbnail: raw.thumbnail,
        }
    }
}

impl CatalogEntry {
    pub fn new(id: i64, title: impl Into<String>, price: f64) -> Self {
        Self {
            id: Some(id),
            title: Some(title.into()),
            price,
            stock: DEFAULT_STOCK,
            discount_percentage: DEFAULT_DISCOUNT_PERCENTAGE,
            thumbnail: None,
        }
    }

    pub fn with_stock(mut self, stock: u64) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_discount(mut self, discount_percentage: f64) -> Self {
        self.discount_percentage = discount_percentage;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_resolve_to_defaults() {
        let entry: CatalogEntry = serde_json::from_str(r#"{"id": 7, "title": "Bare"}"#).unwrap();

        assert_eq!(entry.price, 0.0);
        assert_eq!(entry.stock, 1);
        assert_eq!(entry.discount_percentage, 0.0);
        assert_eq!(entry.thumbnail, None);
    }

    #[test]
    fn test_null_fields_resolve_to_defaults() {
        let entry: CatalogEntry = serde_json::from_str(
            r#"{"id": 1, "title": "Nulls", "price": null, "stock": null, "discountPercentage": null}"#,
        )
        .unwrap();

        assert_eq!(entry.price, 0.0);
        assert_eq!(entry.stock, 1);
        assert_eq!(entry.discount_percentage, 0.0);
    }

    #[test]
    fn test_full_entry_and_unknown_fields() {
        let entry: CatalogEntry = serde_json::from_str(
            r#"{
                "id": 2,
                "title": "Expensive Product",
                "price": 150,
                "stock": 5,
                "discountPercentage": 5,
                "rating": 4.5,
                "thumbnail": "https://example.com/2.jpg"
            }"#,
        )
        .unwrap();

        assert_eq!(
            entry,
            CatalogEntry::new(2, "Expensive Product", 150.0)
                .with_stock(5)
                .with_discount(5.0)
                .with_thumbnail("https://example.com/2.jpg")
        );
    }

    #[test]
    fn test_catalog_without_products_is_empty() {
        let catalog: Catalog = serde_json::from_str("{}").unwrap();
        assert!(catalog.is_empty());

        let catalog: Catalog = serde_json::from_str(r#"{"products": [], "total": 0}"#).unwrap();
        assert_eq!(catalog.len(), 0);
    }
}
