//! Product and nutrition data model.
//!
//! These types are produced by the extraction engine and consumed by the
//! cache, the search pipeline, and the CLI renderer.

use serde::{Deserialize, Serialize};

/// Sentinel price used when no price could be recovered for a product.
pub const PRICE_UNAVAILABLE: &str = "Price not available";

/// Partial nutrition record for one product, per stated serving size.
///
/// Absent fields mean "unknown", never zero. An all-empty record is still a
/// meaningful cache value: it marks a product whose page was fetched but
/// carried no recognizable nutrition block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

impl NutritionFacts {
    /// True when no nutrient field is set.
    pub fn is_empty(&self) -> bool {
        self.serving_size.is_none()
            && self.energy.is_none()
            && self.protein.is_none()
            && self.carbs.is_none()
            && self.fat.is_none()
            && self.salt.is_none()
    }
}

/// A single grocery item's extracted listing data.
///
/// Transient, produced per search. `price` holds [`PRICE_UNAVAILABLE`] until
/// the enrichment pass finds something better; the supplementary fields
/// default to empty strings (or `true` for availability).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub brand: String,
    pub product_id: String,
    pub url: String,
    pub price: String,
    #[serde(default)]
    pub unit_price: String,
    #[serde(default)]
    pub promotion: String,
    #[serde(default = "default_available")]
    pub availability: bool,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "NutritionFacts::is_empty")]
    pub nutrition: NutritionFacts,
}

fn default_available() -> bool {
    true
}

impl Default for Product {
    fn default() -> Self {
        Self {
            name: String::new(),
            brand: String::new(),
            product_id: String::new(),
            url: String::new(),
            price: PRICE_UNAVAILABLE.to_string(),
            unit_price: String::new(),
            promotion: String::new(),
            availability: true,
            image: String::new(),
            nutrition: NutritionFacts::default(),
        }
    }
}

impl Product {
    /// Validity gate applied before a candidate is returned to callers.
    ///
    /// A product counts only with a name longer than 5 characters and both
    /// a product id and a detail URL present.
    pub fn is_valid(&self) -> bool {
        self.name.trim().chars().count() > 5
            && !self.product_id.is_empty()
            && !self.url.is_empty()
    }
}

/// One element of a search result: a product, or a structured error entry
/// when the search as a whole produced nothing.
///
/// Serializes untagged so an error renders as `{"error": "<message>"}` and
/// a product as its plain object, matching the inbound caller contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchItem {
    Product(Box<Product>),
    Error { error: String },
}

impl SearchItem {
    /// Build an error entry with a human-readable message.
    pub fn error(message: impl Into<String>) -> Self {
        SearchItem::Error { error: message.into() }
    }

    /// The product, if this entry is one.
    pub fn as_product(&self) -> Option<&Product> {
        match self {
            SearchItem::Product(p) => Some(p),
            SearchItem::Error { .. } => None,
        }
    }
}

impl From<Product> for SearchItem {
    fn from(product: Product) -> Self {
        SearchItem::Product(Box::new(product))
    }
}
