//! Product descriptors as served by the catalog.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product offered on the marketplace.
///
/// The JSON shape matches the catalog feed: `price` is a plain number and
/// `image` / `location` are free-form strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in the default currency.
    #[serde(with = "super::price::non_negative")]
    pub price: Decimal,
    /// Image path or URL.
    pub image: String,
    /// Seller location, e.g. "Accra, Ghana".
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Product {
    /// Unit price with currency attached.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        Price::local(self.price)
    }

    /// Case-insensitive substring match over the searchable text fields.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        let hit = |field: &str| field.to_lowercase().contains(needle);
        hit(&self.name)
            || hit(&self.location)
            || self.category.as_deref().is_some_and(hit)
            || self.description.as_deref().is_some_and(hit)
    }
}
