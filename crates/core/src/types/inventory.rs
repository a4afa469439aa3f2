//! Inventory tracking for products.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{InventoryId, ProductId};
use super::product::Product;

/// Stock level and low-stock threshold for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: InventoryId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub low_stock_threshold: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl InventoryRecord {
    /// Threshold applied when none is given.
    pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

    /// Low stock means at or below the threshold.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }

    #[must_use]
    pub const fn status(&self) -> StockStatus {
        if self.is_low_stock() {
            StockStatus::Low
        } else {
            StockStatus::InStock
        }
    }
}

/// Stock badge shown on the inventory screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    NotTracked,
    Low,
    InStock,
}

impl StockStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotTracked => "Not tracked",
            Self::Low => "Low Stock",
            Self::InStock => "In Stock",
        }
    }

    /// CSS modifier for the badge.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::NotTracked => "badge--muted",
            Self::Low => "badge--warning",
            Self::InStock => "badge--success",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A product joined with its inventory row, if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductWithInventory {
    pub product: Product,
    pub inventory: Option<InventoryRecord>,
}

impl ProductWithInventory {
    #[must_use]
    pub fn status(&self) -> StockStatus {
        self.inventory
            .as_ref()
            .map_or(StockStatus::NotTracked, InventoryRecord::status)
    }

    /// Case-insensitive substring match over name, category and brand.
    #[must_use]
    pub fn matches_filter(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            self.product.name.as_str(),
            self.product.category.as_str(),
            self.product.brand.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;
    use crate::types::product::fixtures::product;

    fn record(quantity: u32, low_stock_threshold: u32) -> InventoryRecord {
        InventoryRecord {
            id: InventoryId::random(),
            product_id: ProductId::random(),
            quantity,
            low_stock_threshold,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        assert!(record(5, 5).is_low_stock());
        assert!(record(0, 1).is_low_stock());
        assert!(!record(6, 5).is_low_stock());
        assert_eq!(record(6, 5).status(), StockStatus::InStock);
    }

    #[test]
    fn test_untracked_status() {
        let row = ProductWithInventory {
            product: product("Tonic", dec!(3), 0),
            inventory: None,
        };
        assert_eq!(row.status(), StockStatus::NotTracked);
        assert_eq!(row.status().label(), "Not tracked");
    }

    #[test]
    fn test_filter_skips_description() {
        let mut p = product("Pinot Noir", dec!(24), 3);
        p.brand = "Hillcrest".to_owned();
        p.description = "smoky".to_owned();
        let row = ProductWithInventory {
            product: p,
            inventory: Some(record(3, 10)),
        };
        assert!(row.matches_filter("pinot"));
        assert!(row.matches_filter("HILL"));
        assert!(row.matches_filter("mixers"));
        assert!(!row.matches_filter("smoky"));
    }
}
