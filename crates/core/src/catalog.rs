//! Catalog queries over an in-memory product list.
//!
//! The storefront fetches the whole catalog at once (and caches it), so
//! filtering, search and the category chips are plain functions here.

use std::collections::HashMap;

use crate::types::{InventoryRecord, Product, ProductId, ProductWithInventory};

/// The pseudo-category that matches every product.
pub const ALL_CATEGORIES: &str = "all";

/// Set each product's stock from its inventory row (zero when untracked)
/// and derive the featured flag from its price.
pub fn merge_stock(products: &mut [Product], inventory: &[InventoryRecord]) {
    let stock: HashMap<ProductId, u32> = inventory
        .iter()
        .map(|row| (row.product_id, row.quantity))
        .collect();
    for product in products {
        product.stock = stock.get(&product.id).copied().unwrap_or(0);
        product.featured = product.price.is_featured();
    }
}

/// Join products with their inventory rows, preserving product order.
#[must_use]
pub fn join_inventory(
    products: Vec<Product>,
    inventory: Vec<InventoryRecord>,
) -> Vec<ProductWithInventory> {
    let mut by_product: HashMap<ProductId, InventoryRecord> = inventory
        .into_iter()
        .map(|row| (row.product_id, row))
        .collect();
    products
        .into_iter()
        .map(|product| {
            let inventory = by_product.remove(&product.id);
            ProductWithInventory { product, inventory }
        })
        .collect()
}

/// Products in `category`, or all of them for [`ALL_CATEGORIES`].
#[must_use]
pub fn filter_by_category<'a>(products: &'a [Product], category: &str) -> Vec<&'a Product> {
    let category = category.trim();
    if category.is_empty() || category.eq_ignore_ascii_case(ALL_CATEGORIES) {
        return products.iter().collect();
    }
    products
        .iter()
        .filter(|p| p.category.as_str() == category)
        .collect()
}

#[must_use]
pub fn featured(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|p| p.featured).collect()
}

#[must_use]
pub fn search<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    products.iter().filter(|p| p.matches_search(query)).collect()
}

/// `"all"` followed by each distinct product category in first-seen order.
#[must_use]
pub fn category_names(products: &[Product]) -> Vec<String> {
    let mut names = vec![ALL_CATEGORIES.to_owned()];
    for product in products {
        let name = product.category.as_str();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use rust_decimal::dec;

    use super::*;
    use crate::types::product::fixtures::product;
    use crate::types::{InventoryId, ProductCategory};

    fn catalog() -> Vec<Product> {
        let mut stout = product("Oatmeal Stout", dec!(9), 0);
        stout.category = ProductCategory::Beer;
        let mut malbec = product("Malbec", dec!(31), 0);
        malbec.category = ProductCategory::Wine;
        let mut porter = product("Porter", dec!(8), 0);
        porter.category = ProductCategory::Beer;
        let soda = product("Soda Water", dec!(2), 0);
        vec![stout, malbec, porter, soda]
    }

    fn row(product_id: ProductId, quantity: u32) -> InventoryRecord {
        InventoryRecord {
            id: InventoryId::random(),
            product_id,
            quantity,
            low_stock_threshold: 5,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_merge_stock_defaults_to_zero() {
        let mut products = catalog();
        let inventory = vec![row(products[0].id, 12)];
        merge_stock(&mut products, &inventory);
        assert_eq!(products[0].stock, 12);
        assert_eq!(products[1].stock, 0);
        assert!(products[1].featured);
        assert!(!products[0].featured);
    }

    #[test]
    fn test_join_inventory_keeps_order() {
        let products = catalog();
        let ids: Vec<_> = products.iter().map(|p| p.id).collect();
        let joined = join_inventory(products, vec![row(ids[2], 1)]);
        assert_eq!(joined.len(), 4);
        assert!(joined[2].inventory.is_some());
        assert!(joined[0].inventory.is_none());
        assert_eq!(joined[3].product.id, ids[3]);
    }

    #[test]
    fn test_category_names_first_seen() {
        assert_eq!(category_names(&catalog()), ["all", "beer", "wine", "mixers"]);
        assert_eq!(category_names(&[]), ["all"]);
    }

    #[test]
    fn test_filter_by_category() {
        let products = catalog();
        assert_eq!(filter_by_category(&products, "all").len(), 4);
        assert_eq!(filter_by_category(&products, "beer").len(), 2);
        assert!(filter_by_category(&products, "spirits").is_empty());
    }

    #[test]
    fn test_search_empty_matches_all() {
        let products = catalog();
        assert_eq!(search(&products, "").len(), 4);
        assert_eq!(search(&products, "STOUT").len(), 1);
        assert_eq!(search(&products, "wine").len(), 1);
    }
}
