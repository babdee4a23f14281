//! Cart line items and the derived order summary.
//!
//! [`Cart`] holds the pure cart rules: insertion-ordered line items, unique
//! by product id, every quantity at least one. Persistence lives in the
//! storefront's cart store; nothing here performs I/O.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Flat delivery fee charged on any non-empty cart.
pub const DELIVERY_FEE: Decimal = Decimal::from_parts(1500, 0, 0, false, 2);

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "super::price::non_negative")]
    pub price: Decimal,
    pub image: String,
    pub location: String,
    /// Zero is unrepresentable; a stored `0` fails to deserialize.
    pub quantity: NonZeroU32,
}

impl LineItem {
    fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            location: product.location.clone(),
            quantity: NonZeroU32::MIN,
        }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity.get())
    }

    /// Unit price with currency attached.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        Price::local(self.price)
    }
}

/// Result of applying a quantity delta to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// No line with that id.
    Missing,
    /// The line now has this quantity.
    Updated(NonZeroU32),
    /// The quantity dropped to zero or below and the line was removed.
    Removed,
}

/// Derived totals. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

impl CartSummary {
    #[must_use]
    pub fn subtotal_price(&self) -> Price {
        Price::local(self.subtotal)
    }

    #[must_use]
    pub fn delivery_fee_price(&self) -> Price {
        Price::local(self.delivery_fee)
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::local(self.total)
    }
}

/// Errors raised when a stored cart violates the cart rules.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartShapeError {
    #[error("duplicate line item for product {0}")]
    DuplicateItem(ProductId),
}

/// Ordered sequence of line items, unique by product id.
///
/// Serializes as a bare JSON array of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Add one unit of `product`, appending a new line if needed.
    ///
    /// Returns the line's quantity after the add.
    pub fn add(&mut self, product: &Product) -> NonZeroU32 {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return item.quantity;
        }
        let item = LineItem::from_product(product);
        let quantity = item.quantity;
        self.items.push(item);
        quantity
    }

    /// Remove the line for `id`. Returns the removed line, if any.
    pub fn remove(&mut self, id: ProductId) -> Option<LineItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Add `delta` to the quantity of the line for `id`.
    ///
    /// A resulting quantity of zero or less removes the line.
    pub fn update_quantity(&mut self, id: ProductId, delta: i64) -> QuantityChange {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return QuantityChange::Missing;
        };

        let next = i64::from(item.quantity.get()).saturating_add(delta);
        if next <= 0 {
            self.remove(id);
            return QuantityChange::Removed;
        }

        let next = u32::try_from(next).unwrap_or(u32::MAX);
        item.quantity = NonZeroU32::new(next).unwrap_or(NonZeroU32::MIN);
        QuantityChange::Updated(item.quantity)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Compute subtotal, delivery fee and total from the current lines.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        let subtotal: Decimal = self.items.iter().map(LineItem::line_total).sum();
        let delivery_fee = if self.items.is_empty() {
            Decimal::ZERO
        } else {
            DELIVERY_FEE
        };
        CartSummary {
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
        }
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CartShapeError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        for (index, item) in items.iter().enumerate() {
            if items.iter().skip(index + 1).any(|other| other.id == item.id) {
                return Err(CartShapeError::DuplicateItem(item.id));
            }
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
