//! Cart store.
//!
//! Owns the in-memory [`Cart`] and mirrors it to durable storage under
//! [`keys::CART`] after every mutation. Presentation layers subscribe to
//! [`CartEvent`]s instead of the store knowing how it is rendered.

use std::fmt;
use std::num::NonZeroU32;

use marketplace_core::{Cart, CartSummary, LineItem, Product, ProductId, QuantityChange};
use thiserror::Error;

use crate::error::add_breadcrumb;
use crate::storage::{SharedStore, StorageError, keys, load_json, save_json};

/// Errors that can occur in cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Loading or saving the cart failed. Malformed stored data surfaces
    /// here as `StorageError::Parse`.
    #[error("cart storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A change that has just been applied and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// The cart was loaded from storage.
    Restored { items: usize },
    /// A product was added; `quantity` is the line's new quantity.
    Added { id: ProductId, quantity: NonZeroU32 },
    /// A line was removed.
    Removed { id: ProductId },
    /// A line's quantity changed without removing it.
    QuantityChanged { id: ProductId, quantity: NonZeroU32 },
    /// Every line was removed.
    Cleared,
}

type Observer = Box<dyn Fn(&CartEvent, &Cart) + Send + Sync>;

/// The cart plus its persistence.
pub struct CartStore {
    cart: Cart,
    store: SharedStore,
    observers: Vec<Observer>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create an empty cart backed by `store`. Nothing is read until
    /// [`restore`](Self::restore) is called.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self {
            cart: Cart::new(),
            store,
            observers: Vec::new(),
        }
    }

    /// Register a callback invoked after each applied change.
    pub fn subscribe(&mut self, observer: impl Fn(&CartEvent, &Cart) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Load the persisted cart, if any.
    ///
    /// An absent slot leaves the in-memory cart untouched.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the stored value is malformed or the
    /// backend cannot be read. The in-memory cart is left as it was.
    pub fn restore(&mut self) -> Result<(), CartError> {
        let Some(cart) = load_json::<Cart>(&*self.store, keys::CART)? else {
            tracing::debug!("No saved cart");
            return Ok(());
        };

        tracing::debug!(items = cart.len(), "Cart restored");
        self.cart = cart;
        self.notify(&CartEvent::Restored {
            items: self.cart.len(),
        });
        Ok(())
    }

    /// Add one unit of `product`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be saved.
    pub fn add(&mut self, product: &Product) -> Result<NonZeroU32, CartError> {
        let quantity = self.cart.add(product);
        self.persist()?;

        let id = product.id.to_string();
        add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));
        tracing::debug!(product_id = %product.id, quantity = quantity.get(), "Added to cart");

        self.notify(&CartEvent::Added {
            id: product.id,
            quantity,
        });
        Ok(quantity)
    }

    /// Remove the line for `id`. Absent ids are not an error.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be saved.
    pub fn remove(&mut self, id: ProductId) -> Result<Option<LineItem>, CartError> {
        let removed = self.cart.remove(id);
        self.persist()?;

        if removed.is_some() {
            let id_str = id.to_string();
            add_breadcrumb("cart", "Removed item", Some(&[("product_id", id_str.as_str())]));
            tracing::debug!(product_id = %id, "Removed from cart");
            self.notify(&CartEvent::Removed { id });
        }
        Ok(removed)
    }

    /// Add `delta` to the quantity of the line for `id`.
    ///
    /// Unknown ids are ignored. A result of zero or below behaves like
    /// [`remove`](Self::remove).
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be saved.
    pub fn update_quantity(
        &mut self,
        id: ProductId,
        delta: i64,
    ) -> Result<QuantityChange, CartError> {
        if self.cart.get(id).is_none() {
            return Ok(QuantityChange::Missing);
        }

        let change = self.cart.update_quantity(id, delta);
        self.persist()?;

        match change {
            QuantityChange::Updated(quantity) => {
                tracing::debug!(product_id = %id, delta, quantity = quantity.get(), "Cart quantity updated");
                self.notify(&CartEvent::QuantityChanged { id, quantity });
            }
            QuantityChange::Removed => {
                tracing::debug!(product_id = %id, delta, "Cart quantity reached zero");
                self.notify(&CartEvent::Removed { id });
            }
            QuantityChange::Missing => {}
        }
        Ok(change)
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be saved.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.cart.clear();
        self.persist()?;
        self.notify(&CartEvent::Cleared);
        Ok(())
    }

    /// Current subtotal, delivery fee and total.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.cart.summary()
    }

    /// Write the full line sequence to storage, replacing the prior value.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if encoding or the write fails.
    pub fn persist(&self) -> Result<(), CartError> {
        save_json(&*self.store, keys::CART, &self.cart)?;
        Ok(())
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    fn notify(&self, event: &CartEvent) {
        for observer in &self.observers {
            observer(event, &self.cart);
        }
    }
}
