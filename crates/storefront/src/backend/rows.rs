//! Row shapes of the backend tables, as PostgREST sends and accepts them.
//!
//! Columns the backend may leave empty are `Option` here; the defaults are
//! applied once, in [`super::conversions`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bottleshop_core::{CategoryId, InventoryId, ProductId, UserId};

/// A row of `products`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default)]
    pub alcohol_content: Option<Decimal>,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A new row for `products`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewProductRow {
    pub name: String,
    pub brand: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category_id: Option<CategoryId>,
    pub volume: u32,
    pub alcohol_content: Decimal,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
    pub description: String,
}

/// A row of `inventory`.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryRow {
    pub id: InventoryId,
    pub product_id: ProductId,
    pub quantity: i64,
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A new row for `inventory`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NewInventoryRow {
    pub product_id: ProductId,
    pub quantity: u32,
    pub low_stock_threshold: u32,
}

/// Changes applied to an existing `inventory` row.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InventoryChanges {
    pub quantity: u32,
    pub low_stock_threshold: u32,
    pub updated_at: DateTime<Utc>,
}

/// A row of `profiles`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
    #[serde(default)]
    pub preferred_theme: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
