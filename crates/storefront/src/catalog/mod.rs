//! Product catalog client.
//!
//! The catalog is a read-only JSON array of products served over HTTP or
//! read from a local file. Fetch failures never reach the caller of
//! [`CatalogClient::fetch_products`]: they are logged and an empty list is
//! returned. Successful fetches are cached using `moka`.

mod cache;

use std::sync::Arc;

use moka::future::Cache;
use thiserror::Error;
use tracing::instrument;

use marketplace_core::{Product, ProductId};

use crate::config::{CatalogConfig, CatalogSource};

use cache::{CacheKey, CacheValue};

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog server answered with a non-success status.
    #[error("catalog returned HTTP {0}")]
    Status(u16),

    /// Catalog file could not be read.
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog body is not a product array.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the product catalog.
///
/// Cheaply cloneable; clones share the HTTP client and cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    source: CatalogSource,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("source", &self.inner.source)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a catalog client using a shared HTTP client.
    #[must_use]
    pub fn new(config: &CatalogConfig, client: reqwest::Client) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client,
                source: config.source.clone(),
                cache,
            }),
        }
    }

    /// All products, in catalog order.
    ///
    /// Any failure is logged and yields an empty list.
    pub async fn fetch_products(&self) -> Arc<[Product]> {
        match self.try_fetch_products().await {
            Ok(products) => products,
            Err(e) => {
                tracing::error!(error = %e, source = ?self.inner.source, "Error loading products");
                Arc::from(Vec::new())
            }
        }
    }

    /// All products, surfacing the failure instead of hiding it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the catalog cannot be fetched or parsed.
    #[instrument(skip(self))]
    pub async fn try_fetch_products(&self) -> Result<Arc<[Product]>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            tracing::debug!(count = products.len(), "Catalog cache hit");
            return Ok(products);
        }

        let products: Arc<[Product]> = Arc::from(self.load().await?);
        tracing::debug!(count = products.len(), "Catalog loaded");

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// Look up a single product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the catalog cannot be fetched, so callers
    /// can tell an outage apart from an unknown id.
    pub async fn find(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        let products = self.try_fetch_products().await?;
        Ok(products.iter().find(|product| product.id == id).cloned())
    }

    /// Products matching a search-bar term.
    ///
    /// The term is trimmed; a blank term is not a search and returns `None`.
    /// Matching is case-insensitive over name, location, category and
    /// description, keeping catalog order.
    pub async fn search(&self, term: &str) -> Option<Vec<Product>> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let hits: Vec<Product> = self
            .fetch_products()
            .await
            .iter()
            .filter(|product| product.matches(&needle))
            .cloned()
            .collect();
        tracing::debug!(term = %needle, hits = hits.len(), "Catalog search");
        Some(hits)
    }

    /// Drop cached catalog data so the next call refetches.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate(&CacheKey::Products).await;
    }

    async fn load(&self) -> Result<Vec<Product>, CatalogError> {
        let body = match &self.inner.source {
            CatalogSource::Http(url) => {
                let response = self.inner.client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(CatalogError::Status(status.as_u16()));
                }
                response.text().await?
            }
            CatalogSource::File(path) => tokio::fs::read_to_string(path).await?,
        };

        Ok(serde_json::from_str(&body)?)
    }
}
