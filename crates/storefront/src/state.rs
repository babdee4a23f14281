//! The storefront session.
//!
//! A [`Storefront`] is opened at session start and handed to whatever
//! handles user events. It owns the cart, the signed-in account and the
//! catalog client; there is no global state.

use std::num::NonZeroU32;
use std::sync::Arc;

use marketplace_core::{Email, ProductId, QuantityChange, UserProfile};

use crate::cart::{CartEvent, CartStore};
use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::forms::{LoginForm, RegisterForm};
use crate::services::auth::{AuthError, AuthService, HostedAuthClient};
use crate::storage::{FileStore, SharedStore};
use crate::views::{AccountView, CartView, ProductView};

/// One user's storefront session.
pub struct Storefront {
    config: StorefrontConfig,
    cart: CartStore,
    auth: Option<AuthService<HostedAuthClient>>,
    catalog: CatalogClient,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("cart_items", &self.cart.items().len())
            .field("auth_enabled", &self.auth.is_some())
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Open a session backed by the configured storage file.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file cannot be read, or if the
    /// stored cart or profile is malformed.
    pub fn open(config: StorefrontConfig) -> Result<Self> {
        let store: SharedStore = Arc::new(FileStore::open(&config.storage_path)?);
        Self::with_store(config, store)
    }

    /// Open a session on an existing store.
    ///
    /// Restores the cart and the signed-in profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the stored
    /// cart or profile is malformed.
    pub fn with_store(config: StorefrontConfig, store: SharedStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let catalog = CatalogClient::new(&config.catalog, http.clone());

        let mut cart = CartStore::new(Arc::clone(&store));
        cart.restore()?;

        let auth = match &config.auth {
            Some(auth_config) => {
                let backend = HostedAuthClient::new(auth_config, http);
                let mut service = AuthService::new(backend, Arc::clone(&store));
                service.check_auth()?;
                Some(service)
            }
            None => {
                tracing::debug!("Auth service not configured");
                None
            }
        };

        tracing::info!(
            cart_items = cart.items().len(),
            signed_in = auth.as_ref().is_some_and(AuthService::is_authenticated),
            "Storefront session opened"
        );

        Ok(Self {
            config,
            cart,
            auth,
            catalog,
        })
    }

    /// End the session, flushing the cart one last time.
    ///
    /// # Errors
    ///
    /// Returns an error if the final persist fails.
    pub fn close(self) -> Result<()> {
        self.cart.persist()?;
        tracing::debug!("Storefront session closed");
        Ok(())
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Register a cart observer, e.g. to redraw a cart badge.
    pub fn on_cart_change(
        &mut self,
        observer: impl Fn(&CartEvent, &marketplace_core::Cart) + Send + Sync + 'static,
    ) {
        self.cart.subscribe(observer);
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Product cards for the listing page, optionally filtered by a
    /// search term. A blank term shows everything.
    pub async fn products(&self, search: Option<&str>) -> Vec<ProductView> {
        if let Some(term) = search
            && let Some(hits) = self.catalog.search(term).await
        {
            return hits.iter().map(ProductView::from).collect();
        }

        self.catalog
            .fetch_products()
            .await
            .iter()
            .map(ProductView::from)
            .collect()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one unit of a catalog product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the catalog has no such product,
    /// `AppError::Catalog` if the catalog cannot be fetched, or a cart error
    /// if the cart cannot be saved.
    pub async fn add_to_cart(&mut self, id: ProductId) -> Result<NonZeroU32> {
        let product = self
            .catalog
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
        Ok(self.cart.add(&product)?)
    }

    /// Remove a product from the cart. Absent products are ignored.
    ///
    /// # Errors
    ///
    /// Returns a cart error if the cart cannot be saved.
    pub fn remove_from_cart(&mut self, id: ProductId) -> Result<()> {
        self.cart.remove(id)?;
        Ok(())
    }

    /// Change a cart line's quantity by `delta`.
    ///
    /// # Errors
    ///
    /// Returns a cart error if the cart cannot be saved.
    pub fn update_quantity(&mut self, id: ProductId, delta: i64) -> Result<QuantityChange> {
        Ok(self.cart.update_quantity(id, delta)?)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns a cart error if the cart cannot be saved.
    pub fn clear_cart(&mut self) -> Result<()> {
        Ok(self.cart.clear()?)
    }

    #[must_use]
    pub fn cart_view(&self) -> CartView {
        CartView::from(self.cart.cart())
    }

    /// Start checkout for the current cart.
    ///
    /// Checkout is not wired to a payment provider; this validates the cart
    /// is non-empty and returns the totals to confirm.
    ///
    /// # Errors
    ///
    /// Returns `AppError::EmptyCart` when the cart is empty.
    pub fn checkout(&self) -> Result<CartView> {
        let view = self.cart_view();
        if view.is_empty() {
            return Err(AppError::EmptyCart);
        }
        add_breadcrumb("checkout", "Proceeding to checkout", None);
        tracing::info!(items = view.item_count, total = %view.total, "Proceeding to checkout");
        Ok(view)
    }

    // =========================================================================
    // Account
    // =========================================================================

    fn auth_mut(&mut self) -> std::result::Result<&mut AuthService<HostedAuthClient>, AuthError> {
        self.auth.as_mut().ok_or(AuthError::NotConfigured)
    }

    /// Sign in.
    ///
    /// # Errors
    ///
    /// Returns an auth error if the form is invalid, the credentials are
    /// rejected or auth is not configured.
    pub async fn login(&mut self, form: LoginForm) -> Result<AccountView> {
        let profile = self.auth_mut()?.login(form).await?;
        Ok(AccountView::from(profile))
    }

    /// Create an account. The new account is not signed in.
    ///
    /// # Errors
    ///
    /// Returns an auth error if the form is invalid, the account exists or
    /// auth is not configured.
    pub async fn register(&mut self, form: RegisterForm) -> Result<Email> {
        Ok(self.auth_mut()?.register(form).await?)
    }

    /// Sign out.
    ///
    /// # Errors
    ///
    /// Returns an auth error if auth is not configured or the stored
    /// profile cannot be removed.
    pub async fn logout(&mut self) -> Result<()> {
        Ok(self.auth_mut()?.logout().await?)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&UserProfile> {
        self.auth.as_ref().and_then(AuthService::current_user)
    }

    #[must_use]
    pub fn account(&self) -> Option<AccountView> {
        self.current_user().map(AccountView::from)
    }
}
