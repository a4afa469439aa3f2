//! Admin inventory management.
//!
//! Lists products joined with their inventory rows and passes admin writes
//! straight through to the backend. Every write goes out with the admin's
//! own access token, so row-level security on the backend applies.

use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::instrument;

use bottleshop_core::catalog;
use bottleshop_core::{
    CategoryId, InventoryId, InventoryRecord, Product, ProductCategory, ProductId,
    ProductWithInventory, ValidationErrors,
};

use crate::backend::conversions::{convert_inventory, convert_product};
use crate::backend::rows::{
    InventoryChanges, InventoryRow, NewInventoryRow, NewProductRow, ProductRow,
};
use crate::backend::{BackendClient, BackendError, Query};
use crate::services::CatalogService;

/// Whether an add-or-track created a row or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added,
    Updated,
}

/// Validated stock settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevels {
    pub quantity: u32,
    pub low_stock_threshold: u32,
}

impl StockLevels {
    /// Parse form fields: quantity must be 0 or higher, threshold at least 1.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn parse(quantity: &str, low_stock_threshold: &str) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let quantity = parse_bounded(quantity, 0)
            .map_err(|()| errors.add("quantity", "Quantity must be 0 or higher"))
            .ok();
        let low_stock_threshold = parse_bounded(low_stock_threshold, 1)
            .map_err(|()| errors.add("low_stock_threshold", "Threshold must be at least 1"))
            .ok();

        match (quantity, low_stock_threshold) {
            (Some(quantity), Some(low_stock_threshold)) => Ok(Self {
                quantity,
                low_stock_threshold,
            }),
            _ => Err(errors),
        }
    }
}

/// Parse a whole number no smaller than `min`.
fn parse_bounded(raw: &str, min: u32) -> Result<u32, ()> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| n >= min)
        .ok_or(())
}

/// A validated new product, with optional initial stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub row: NewProductRow,
    pub initial_stock: Option<StockLevels>,
}

/// Raw product form fields.
#[derive(Debug, Clone, Default)]
pub struct NewProductFields<'a> {
    pub name: &'a str,
    pub brand: &'a str,
    pub category: &'a str,
    pub category_id: &'a str,
    pub volume: &'a str,
    pub alcohol_content: &'a str,
    pub price: &'a str,
    pub image: &'a str,
    pub description: &'a str,
    pub quantity: &'a str,
    pub low_stock_threshold: &'a str,
}

impl NewProduct {
    /// Validate the product form.
    ///
    /// Stock is optional: an empty quantity creates an untracked product.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn parse(fields: &NewProductFields<'_>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = fields.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }

        let price = Decimal::from_str(fields.price.trim())
            .ok()
            .filter(|p| !p.is_sign_negative());
        if price.is_none() {
            errors.add("price", "Price must be a number of 0 or more");
        }

        let volume = if fields.volume.trim().is_empty() {
            Some(0)
        } else {
            parse_bounded(fields.volume, 0).ok()
        };
        if volume.is_none() {
            errors.add("volume", "Volume must be a whole number of millilitres");
        }

        let alcohol_content = if fields.alcohol_content.trim().is_empty() {
            Some(Decimal::ZERO)
        } else {
            Decimal::from_str(fields.alcohol_content.trim())
                .ok()
                .filter(|a| !a.is_sign_negative() && *a <= Decimal::ONE_HUNDRED)
        };
        if alcohol_content.is_none() {
            errors.add("alcohol_content", "Alcohol content must be between 0 and 100");
        }

        let category_id = match fields.category_id.trim() {
            "" => None,
            raw => {
                let parsed = CategoryId::parse(raw).ok();
                if parsed.is_none() {
                    errors.add("category_id", "Unknown category");
                }
                parsed
            }
        };

        let image = match fields.image.trim() {
            "" => None,
            raw if raw.starts_with('/') || url::Url::parse(raw).is_ok() => Some(raw.to_string()),
            _ => {
                errors.add("image", "Image must be a URL or a site path");
                None
            }
        };

        let initial_stock = if fields.quantity.trim().is_empty() {
            None
        } else {
            let threshold = match fields.low_stock_threshold.trim() {
                "" => InventoryRecord::DEFAULT_LOW_STOCK_THRESHOLD.to_string(),
                raw => raw.to_string(),
            };
            match StockLevels::parse(fields.quantity, &threshold) {
                Ok(levels) => Some(levels),
                Err(stock_errors) => {
                    for e in stock_errors.iter() {
                        errors.add(e.field, e.message.clone());
                    }
                    None
                }
            }
        };

        let category = ProductCategory::parse(fields.category);

        match (price, volume, alcohol_content) {
            (Some(price), Some(volume), Some(alcohol_content)) if errors.is_empty() => Ok(Self {
                row: NewProductRow {
                    name: name.to_string(),
                    brand: fields.brand.trim().to_string(),
                    category: category.as_str().to_string(),
                    category_id,
                    volume,
                    alcohol_content,
                    price,
                    image,
                    description: fields.description.trim().to_string(),
                },
                initial_stock,
            }),
            _ => Err(errors),
        }
    }
}

/// Inventory administration on behalf of a signed-in admin.
pub struct InventoryService<'a> {
    backend: &'a BackendClient,
    catalog: &'a CatalogService,
    token: &'a str,
}

impl<'a> InventoryService<'a> {
    #[must_use]
    pub const fn new(backend: &'a BackendClient, catalog: &'a CatalogService, token: &'a str) -> Self {
        Self {
            backend,
            catalog,
            token,
        }
    }

    /// Every product with its inventory row, filtered by name, category or
    /// brand. Always read fresh, bypassing the catalog cache.
    ///
    /// # Errors
    ///
    /// Returns an error if either table can't be read.
    #[instrument(skip(self))]
    pub async fn overview(&self, filter: &str) -> Result<Vec<ProductWithInventory>, BackendError> {
        let products = self.catalog.fetch_products().await?;
        let inventory = self.catalog.fetch_inventory().await?;
        Ok(catalog::join_inventory(products, inventory)
            .into_iter()
            .filter(|row| row.matches_filter(filter))
            .collect())
    }

    /// Set stock for a product: update its row if it has one, else insert.
    ///
    /// The lookup and the write are separate requests.
    ///
    /// # Errors
    ///
    /// Returns an error if any request fails.
    #[instrument(skip(self))]
    pub async fn upsert_for_product(
        &self,
        product_id: ProductId,
        levels: StockLevels,
    ) -> Result<UpsertOutcome, BackendError> {
        let existing: Option<InventoryRow> = self
            .backend
            .select_one(
                &Query::table("inventory")
                    .select("*")
                    .eq("product_id", product_id)
                    .limit(1),
                Some(self.token),
            )
            .await?;

        let outcome = if existing.is_some() {
            let _: InventoryRow = self
                .backend
                .update(
                    &Query::table("inventory").eq("product_id", product_id),
                    &changes(levels),
                    Some(self.token),
                )
                .await?;
            UpsertOutcome::Updated
        } else {
            let _: InventoryRow = self
                .backend
                .insert(
                    "inventory",
                    &NewInventoryRow {
                        product_id,
                        quantity: levels.quantity,
                        low_stock_threshold: levels.low_stock_threshold,
                    },
                    Some(self.token),
                )
                .await?;
            UpsertOutcome::Added
        };

        self.catalog.invalidate().await;
        Ok(outcome)
    }

    /// Update an inventory row by id.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the row doesn't exist.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: InventoryId,
        levels: StockLevels,
    ) -> Result<InventoryRecord, BackendError> {
        let row: InventoryRow = self
            .backend
            .update(
                &Query::table("inventory").eq("id", id),
                &changes(levels),
                Some(self.token),
            )
            .await?;
        self.catalog.invalidate().await;
        Ok(convert_inventory(row))
    }

    /// Delete an inventory row by id. The product becomes untracked.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: InventoryId) -> Result<(), BackendError> {
        self.backend
            .delete(&Query::table("inventory").eq("id", id), Some(self.token))
            .await?;
        self.catalog.invalidate().await;
        Ok(())
    }

    /// Insert a product and, when given, its initial inventory row.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails. A failed inventory insert
    /// leaves the product in place, untracked.
    #[instrument(skip(self, product), fields(name = %product.row.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, BackendError> {
        let row: ProductRow = self
            .backend
            .insert("products", &product.row, Some(self.token))
            .await?;
        let mut created = convert_product(row);
        self.catalog.invalidate().await;

        if let Some(levels) = product.initial_stock {
            let _: InventoryRow = self
                .backend
                .insert(
                    "inventory",
                    &NewInventoryRow {
                        product_id: created.id,
                        quantity: levels.quantity,
                        low_stock_threshold: levels.low_stock_threshold,
                    },
                    Some(self.token),
                )
                .await?;
            created.stock = levels.quantity;
        }

        Ok(created)
    }
}

fn changes(levels: StockLevels) -> InventoryChanges {
    InventoryChanges {
        quantity: levels.quantity,
        low_stock_threshold: levels.low_stock_threshold,
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn test_stock_levels_bounds() {
        assert_eq!(
            StockLevels::parse("0", "1").unwrap(),
            StockLevels {
                quantity: 0,
                low_stock_threshold: 1
            }
        );
        let errors = StockLevels::parse("-1", "0").unwrap_err();
        assert_eq!(errors.get("quantity"), Some("Quantity must be 0 or higher"));
        assert_eq!(
            errors.get("low_stock_threshold"),
            Some("Threshold must be at least 1")
        );
        assert!(StockLevels::parse("ten", "5").is_err());
    }

    #[test]
    fn test_new_product_minimal() {
        let product = NewProduct::parse(&NewProductFields {
            name: " Tonic Water ",
            price: "2.50",
            ..NewProductFields::default()
        })
        .unwrap();
        assert_eq!(product.row.name, "Tonic Water");
        assert_eq!(product.row.category, "mixers");
        assert_eq!(product.row.price, dec!(2.50));
        assert_eq!(product.row.image, None);
        assert!(product.initial_stock.is_none());
    }

    #[test]
    fn test_new_product_with_stock_defaults_threshold() {
        let product = NewProduct::parse(&NewProductFields {
            name: "Rye",
            category: "spirits",
            price: "42",
            volume: "750",
            alcohol_content: "45.5",
            quantity: "12",
            ..NewProductFields::default()
        })
        .unwrap();
        assert_eq!(product.row.volume, 750);
        assert_eq!(
            product.initial_stock,
            Some(StockLevels {
                quantity: 12,
                low_stock_threshold: 10
            })
        );
    }

    #[test]
    fn test_new_product_reports_all_errors() {
        let errors = NewProduct::parse(&NewProductFields {
            name: "",
            price: "-1",
            alcohol_content: "140",
            image: "not an image",
            category_id: "abc",
            quantity: "-4",
            ..NewProductFields::default()
        })
        .unwrap_err();
        for field in ["name", "price", "alcohol_content", "image", "category_id", "quantity"] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
    }
}
