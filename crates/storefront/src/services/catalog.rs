//! Product catalog reads.
//!
//! The whole catalog is fetched at once (products joined with inventory
//! stock) and cached in `moka` for a short TTL. Admin writes invalidate it.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use bottleshop_core::catalog;
use bottleshop_core::{Category, InventoryRecord, Product, ProductId};

use crate::backend::conversions::{convert_inventory, convert_product};
use crate::backend::rows::{InventoryRow, ProductRow};
use crate::backend::{BackendClient, BackendError, Query};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct AllProducts;

/// Cached access to products with stock.
#[derive(Clone)]
pub struct CatalogService {
    backend: BackendClient,
    cache: Cache<AllProducts, Arc<Vec<Product>>>,
}

impl CatalogService {
    #[must_use]
    pub fn new(backend: BackendClient, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { backend, cache }
    }

    /// Every product with stock merged in and the featured flag derived.
    ///
    /// # Errors
    ///
    /// Returns an error if either table can't be read.
    #[instrument(skip(self))]
    pub async fn products_with_stock(&self) -> Result<Arc<Vec<Product>>, BackendError> {
        if let Some(products) = self.cache.get(&AllProducts).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let mut products = self.fetch_products().await?;
        let inventory = self.fetch_inventory().await?;
        catalog::merge_stock(&mut products, &inventory);

        let products = Arc::new(products);
        self.cache.insert(AllProducts, Arc::clone(&products)).await;
        Ok(products)
    }

    /// # Errors
    ///
    /// Returns an error if the catalog can't be read.
    pub async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, BackendError> {
        Ok(self
            .products_with_stock()
            .await?
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    /// Products in `category`; `"all"` returns everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog can't be read.
    pub async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, BackendError> {
        let products = self.products_with_stock().await?;
        Ok(catalog::filter_by_category(&products, category)
            .into_iter()
            .cloned()
            .collect())
    }

    /// # Errors
    ///
    /// Returns an error if the catalog can't be read.
    pub async fn featured_products(&self) -> Result<Vec<Product>, BackendError> {
        let products = self.products_with_stock().await?;
        Ok(catalog::featured(&products).into_iter().cloned().collect())
    }

    /// # Errors
    ///
    /// Returns an error if the catalog can't be read.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, BackendError> {
        let products = self.products_with_stock().await?;
        Ok(catalog::search(&products, query)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Category chips for the listing page: `"all"` then each distinct category.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog can't be read.
    pub async fn category_names(&self) -> Result<Vec<String>, BackendError> {
        let products = self.products_with_stock().await?;
        Ok(catalog::category_names(&products))
    }

    /// Rows of the `categories` table, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the table can't be read.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, BackendError> {
        self.backend
            .select(&Query::table("categories").select("*").order("name", true), None)
            .await
    }

    /// Drop the cached catalog so the next read goes to the backend.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&AllProducts).await;
    }

    pub(crate) async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
        let rows: Vec<ProductRow> = self
            .backend
            .select(&Query::table("products").select("*").order("name", true), None)
            .await?;
        Ok(rows.into_iter().map(convert_product).collect())
    }

    pub(crate) async fn fetch_inventory(&self) -> Result<Vec<InventoryRecord>, BackendError> {
        let rows: Vec<InventoryRow> = self
            .backend
            .select(&Query::table("inventory").select("*"), None)
            .await?;
        Ok(rows.into_iter().map(convert_inventory).collect())
    }
}
