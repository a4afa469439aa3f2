//! Seed the catalog from a YAML file.
//!
//! # File format
//!
//! ```yaml
//! products:
//!   - name: Harbour Pale Ale
//!     brand: Harbour Brewing
//!     category: Beer
//!     volume: 330
//!     alcohol_content: "4.8"
//!     price: "3.50"
//!     description: Crisp and hoppy.
//!     quantity: 48            # optional, creates an inventory row
//!     low_stock_threshold: 12 # optional, default 10
//! ```

use std::path::Path;

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{error, info};

use bottleshop_core::{InventoryRecord, ValidationErrors};
use bottleshop_storefront::backend::rows::NewProductRow;
use bottleshop_storefront::services::CatalogService;
use bottleshop_storefront::services::InventoryService;
use bottleshop_storefront::services::inventory::{NewProduct, StockLevels};

use super::connect;

/// Top level of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<SeedProduct>,
}

/// One product entry.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    #[serde(flatten)]
    pub row: NewProductRow,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub low_stock_threshold: Option<u32>,
}

impl SeedProduct {
    /// Check the entry and turn it into an insertable product.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(self) -> Result<NewProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.row.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        if self.row.price.is_sign_negative() {
            errors.add("price", "Price must be 0 or more");
        }
        let threshold = self
            .low_stock_threshold
            .unwrap_or(InventoryRecord::DEFAULT_LOW_STOCK_THRESHOLD);
        if threshold == 0 {
            errors.add("low_stock_threshold", "Threshold must be at least 1");
        }

        let initial_stock = self.quantity.map(|quantity| StockLevels {
            quantity,
            low_stock_threshold: threshold,
        });
        errors.into_result(NewProduct {
            row: self.row,
            initial_stock,
        })
    }
}

/// Parse and validate a seed file's contents.
///
/// # Errors
///
/// Returns the YAML error, or one line per invalid product.
pub fn parse(content: &str) -> Result<Vec<NewProduct>, Box<dyn std::error::Error>> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    let mut products = Vec::with_capacity(file.products.len());
    let mut failures = Vec::new();
    for (index, entry) in file.products.into_iter().enumerate() {
        let name = entry.row.name.clone();
        match entry.validate() {
            Ok(product) => products.push(product),
            Err(errors) => failures.push(format!("#{} {name}: {errors}", index + 1)),
        }
    }

    if failures.is_empty() {
        Ok(products)
    } else {
        for failure in &failures {
            error!("  - {failure}");
        }
        Err(format!("{} invalid product(s) in seed file", failures.len()).into())
    }
}

/// Insert every product in `file_path`, with initial stock where given.
///
/// # Errors
///
/// Returns an error if the file can't be read or parsed, or the backend
/// variables are missing. Failed inserts are reported and skipped.
pub async fn products(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse(&content)?;
    info!(products = products.len(), "Seed file validated");

    if dry_run {
        return Ok(());
    }

    let (config, client) = connect()?;
    let catalog = CatalogService::new(client.clone(), std::time::Duration::from_secs(60));
    let service = InventoryService::new(&client, &catalog, config.api_key.expose_secret());

    let mut inserted = 0usize;
    let mut failed = 0usize;
    for product in &products {
        match service.create_product(product).await {
            Ok(created) => {
                inserted += 1;
                info!(product_id = %created.id, "Inserted {}", created.name);
            }
            Err(e) => {
                failed += 1;
                error!("Failed to insert {}: {e}", product.row.name);
            }
        }
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    if failed > 0 {
        error!("  Failed: {failed}");
    }
    Ok(())
}
