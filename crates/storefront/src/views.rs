//! Display models for front ends.
//!
//! Every monetary value is pre-formatted in cedis with two decimals
//! (`₵25.00`), so front ends only print strings.

use marketplace_core::{Cart, LineItem, Price, Product, UserProfile};

/// Message shown in place of an empty cart.
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty";

/// Product card display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub image: String,
    pub location: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            price: product.unit_price().display(),
            image: product.image.clone(),
            location: product.location.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
        }
    }
}

/// Cart row display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub location: String,
    pub quantity: u32,
    /// Unit price.
    pub price: String,
    pub line_price: String,
}

impl From<&LineItem> for CartItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id.as_i64(),
            name: item.name.clone(),
            image: item.image.clone(),
            location: item.location.clone(),
            quantity: item.quantity.get(),
            price: item.unit_price().display(),
            line_price: Price::local(item.line_total()).display(),
        }
    }
}

/// Cart page display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub delivery_fee: String,
    pub total: String,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&Cart::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let summary = cart.summary();
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: summary.subtotal_price().display(),
            delivery_fee: summary.delivery_fee_price().display(),
            total: summary.total_price().display(),
            item_count: cart.item_count(),
        }
    }
}

/// Account page display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    pub name: String,
    pub email: String,
    pub location: String,
}

impl From<&UserProfile> for AccountView {
    fn from(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.to_string(),
            location: profile.location.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use marketplace_core::{Email, ProductId};

    use super::*;

    fn product(id: i64, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Item {id}"),
            price,
            image: format!("images/{id}.jpg"),
            location: "Accra, Ghana".to_string(),
            description: None,
            category: None,
        }
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::empty();
        assert!(view.is_empty());
        assert_eq!(view.subtotal, "₵0.00");
        assert_eq!(view.delivery_fee, "₵0.00");
        assert_eq!(view.total, "₵0.00");
        assert_eq!(view.item_count, 0);
    }

    #[test]
    fn test_cart_view_formats_totals() {
        let mut cart = Cart::new();
        let ten = product(1, Decimal::new(1000, 2));
        cart.add(&ten);
        cart.add(&ten);
        cart.add(&product(2, Decimal::new(500, 2)));

        let view = CartView::from(&cart);
        assert_eq!(view.subtotal, "₵25.00");
        assert_eq!(view.delivery_fee, "₵15.00");
        assert_eq!(view.total, "₵40.00");
        assert_eq!(view.item_count, 3);

        let first = &view.items[0];
        assert_eq!(first.quantity, 2);
        assert_eq!(first.price, "₵10.00");
        assert_eq!(first.line_price, "₵20.00");
    }

    #[test]
    fn test_product_view_price() {
        let view = ProductView::from(&product(7, Decimal::new(2999, 2)));
        assert_eq!(view.id, 7);
        assert_eq!(view.price, "₵29.99");
    }

    #[test]
    fn test_account_view() {
        let profile = UserProfile::signed_in(
            "Ama Owusu".to_string(),
            Email::parse("ama@example.com").unwrap(),
            "Kumasi, Ghana".to_string(),
        );
        let view = AccountView::from(&profile);
        assert_eq!(view.email, "ama@example.com");
        assert_eq!(view.location, "Kumasi, Ghana");
    }
}
