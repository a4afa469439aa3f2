//! Conversions from backend rows to domain types.

use rust_decimal::Decimal;

use bottleshop_core::types::product::PLACEHOLDER_IMAGE;
use bottleshop_core::{InventoryRecord, Price, Product, ProductCategory, Theme, UserProfile};

use super::rows::{InventoryRow, ProductRow, ProfileRow};

/// Clamp a backend integer into `u32`; negatives become zero.
fn non_negative(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Treat empty strings the same as missing columns.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Convert a product row. Stock starts at zero until merged with inventory.
#[must_use]
pub fn convert_product(row: ProductRow) -> Product {
    let price = Price::usd(row.price);
    Product {
        id: row.id,
        name: row.name,
        brand: row.brand.unwrap_or_default(),
        category: non_empty(row.category)
            .map(ProductCategory::from)
            .unwrap_or_default(),
        category_id: row.category_id,
        volume_ml: row.volume.map_or(0, non_negative),
        alcohol_content: row.alcohol_content.unwrap_or(Decimal::ZERO),
        featured: price.is_featured(),
        price,
        image: non_empty(row.image).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        description: row.description.unwrap_or_default(),
        stock: 0,
    }
}

#[must_use]
pub fn convert_inventory(row: InventoryRow) -> InventoryRecord {
    InventoryRecord {
        id: row.id,
        product_id: row.product_id,
        quantity: non_negative(row.quantity),
        low_stock_threshold: row
            .low_stock_threshold
            .map_or(InventoryRecord::DEFAULT_LOW_STOCK_THRESHOLD, non_negative),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Convert a profile row. An unrecognized theme is treated as unset.
#[must_use]
pub fn convert_profile(row: ProfileRow) -> UserProfile {
    UserProfile {
        id: row.id,
        username: non_empty(row.username),
        avatar_url: non_empty(row.avatar_url),
        is_admin: row.is_admin,
        preferred_theme: row.preferred_theme.as_deref().and_then(Theme::parse),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::dec;
    use serde_json::json;

    use super::*;

    const ID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

    #[test]
    fn test_missing_product_columns_get_defaults() {
        let row: ProductRow = serde_json::from_value(json!({
            "id": ID,
            "name": "House Lager",
            "price": 12.5,
            "brand": null,
            "image": ""
        }))
        .unwrap();
        let product = convert_product(row);

        assert_eq!(product.brand, "");
        assert_eq!(product.category, ProductCategory::Mixers);
        assert_eq!(product.volume_ml, 0);
        assert_eq!(product.alcohol_content, Decimal::ZERO);
        assert_eq!(product.image, "/static/img/placeholder.svg");
        assert_eq!(product.description, "");
        assert_eq!(product.stock, 0);
        assert_eq!(product.price.amount, dec!(12.5));
        assert!(!product.featured);
    }

    #[test]
    fn test_product_columns_are_kept() {
        let row: ProductRow = serde_json::from_value(json!({
            "id": ID,
            "name": "Single Malt",
            "brand": "Glen Test",
            "category": "spirits",
            "volume": 700,
            "alcohol_content": "43.0",
            "price": "64.99",
            "image": "https://cdn.test/malt.png",
            "description": "Peaty"
        }))
        .unwrap();
        let product = convert_product(row);

        assert_eq!(product.category, ProductCategory::Spirits);
        assert_eq!(product.volume_ml, 700);
        assert_eq!(product.alcohol_content, dec!(43.0));
        assert!(product.featured);
        assert_eq!(product.image, "https://cdn.test/malt.png");
    }

    #[test]
    fn test_negative_inventory_is_clamped() {
        let row: InventoryRow = serde_json::from_value(json!({
            "id": ID,
            "product_id": ID,
            "quantity": -3,
            "low_stock_threshold": null
        }))
        .unwrap();
        let record = convert_inventory(row);
        assert_eq!(record.quantity, 0);
        assert_eq!(record.low_stock_threshold, 10);
        assert!(record.is_low_stock());
    }

    #[test]
    fn test_profile_theme_parsing() {
        let row: ProfileRow = serde_json::from_value(json!({
            "id": ID,
            "username": "",
            "preferred_theme": "system",
            "is_admin": true
        }))
        .unwrap();
        let profile = convert_profile(row);
        assert_eq!(profile.username, None);
        assert_eq!(profile.preferred_theme, None);
        assert!(profile.is_admin());
    }
}
