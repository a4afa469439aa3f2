//! The shopping cart.
//!
//! A cart lives in the visitor's session and is never written to the
//! backend. Each item keeps a snapshot of the product taken when it was
//! last added, and every mutation is checked against that snapshot's stock.

use serde::{Deserialize, Serialize};

use crate::types::{Price, Product, ProductId};

/// Why a cart mutation was refused. The cart is unchanged in every case.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("only {available} of {name} in stock")]
    InsufficientStock { name: String, available: u32 },
}

/// What a successful mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Added,
    Increased,
    Updated,
    Removed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    #[serde(default)]
    is_open: bool,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            is_open: false,
        }
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing entry has its quantity increased and its snapshot
    /// replaced with `product`.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity` for a zero quantity; `InsufficientStock` when the
    /// resulting quantity would exceed `product.stock`.
    pub fn add(&mut self, product: Product, quantity: u32) -> Result<CartChange, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let position = self.position(product.id);
        let existing = position
            .and_then(|i| self.items.get(i))
            .map_or(0, |item| item.quantity);
        let wanted = existing
            .checked_add(quantity)
            .filter(|&q| q <= product.stock)
            .ok_or_else(|| CartError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock,
            })?;

        match position.and_then(|i| self.items.get_mut(i)) {
            Some(item) => {
                item.product = product;
                item.quantity = wanted;
                Ok(CartChange::Increased)
            }
            None => {
                self.items.push(CartItem {
                    product,
                    quantity: wanted,
                });
                Ok(CartChange::Added)
            }
        }
    }

    /// Remove a product. Returns whether it was in the cart.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product.id != product_id);
        self.items.len() != before
    }

    /// Set the quantity of an item. Zero or less removes it; unknown
    /// products are ignored.
    ///
    /// # Errors
    ///
    /// `InsufficientStock` when `quantity` exceeds the snapshot's stock. The
    /// previous quantity is kept.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartChange, CartError> {
        if quantity <= 0 {
            return Ok(if self.remove(product_id) {
                CartChange::Removed
            } else {
                CartChange::Unchanged
            });
        }

        let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) else {
            return Ok(CartChange::Unchanged);
        };

        match u32::try_from(quantity) {
            Ok(q) if q <= item.product.stock => {
                item.quantity = q;
                Ok(CartChange::Updated)
            }
            _ => Err(CartError::InsufficientStock {
                name: item.product.name.clone(),
                available: item.product.stock,
            }),
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product.id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of price times quantity over all items.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items.iter().position(|i| i.product.id == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::{Decimal, dec};

    use super::*;
    use crate::types::product::fixtures::product;

    #[test]
    fn test_add_within_stock() {
        for stock in 0..6 {
            for q in 1..8 {
                let p = product("Lager", dec!(4.50), stock);
                let mut cart = Cart::new();
                let result = cart.add(p.clone(), q);
                if q <= stock {
                    assert_eq!(result, Ok(CartChange::Added));
                    assert_eq!(cart.total().amount, dec!(4.50) * Decimal::from(q));
                    assert_eq!(cart.count(), q);
                } else {
                    assert!(matches!(result, Err(CartError::InsufficientStock { .. })));
                    assert!(cart.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_add_zero_is_rejected() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add(product("Lager", dec!(4), 3), 0),
            Err(CartError::InvalidQuantity)
        );
    }

    #[test]
    fn test_add_over_stock_keeps_existing_quantity() {
        let a = product("Product A", dec!(10.00), 4);
        let mut cart = Cart::new();
        cart.add(a.clone(), 2).unwrap();

        let err = cart.add(a.clone(), 3).unwrap_err();
        assert_eq!(
            err,
            CartError::InsufficientStock {
                name: "Product A".to_owned(),
                available: 4
            }
        );
        assert_eq!(cart.get(a.id).unwrap().quantity, 2);
        assert_eq!(cart.total().display(), "$20.00");
    }

    #[test]
    fn test_add_refreshes_snapshot() {
        let mut a = product("Rum", dec!(20), 5);
        let mut cart = Cart::new();
        cart.add(a.clone(), 1).unwrap();

        a.price = Price::usd(dec!(18));
        a.stock = 9;
        assert_eq!(cart.add(a.clone(), 6), Ok(CartChange::Increased));
        assert_eq!(cart.items()[0].product.stock, 9);
        assert_eq!(cart.total().amount, dec!(126));
    }

    #[test]
    fn test_update_quantity() {
        let a = product("Gin", dec!(35), 3);
        let mut cart = Cart::new();
        cart.add(a.clone(), 1).unwrap();

        assert_eq!(cart.update_quantity(a.id, 3), Ok(CartChange::Updated));
        assert!(cart.update_quantity(a.id, 4).is_err());
        assert_eq!(cart.get(a.id).unwrap().quantity, 3);

        assert_eq!(cart.update_quantity(a.id, 0), Ok(CartChange::Removed));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_negative_removes_and_unknown_is_noop() {
        let a = product("Gin", dec!(35), 3);
        let mut cart = Cart::new();
        cart.add(a.clone(), 2).unwrap();

        assert_eq!(
            cart.update_quantity(ProductId::random(), 2),
            Ok(CartChange::Unchanged)
        );
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.update_quantity(a.id, -1), Ok(CartChange::Removed));
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(product("A", dec!(1), 5), 2).unwrap();
        cart.add(product("B", dec!(2), 5), 5).unwrap();
        cart.clear();
        assert_eq!(cart.count(), 0);
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_totals_track_item_sequence() {
        let a = product("A", dec!(3.25), 10);
        let b = product("B", dec!(12), 4);
        let c = product("C", dec!(7.10), 2);
        let mut cart = Cart::new();

        cart.add(a.clone(), 2).unwrap();
        cart.add(b.clone(), 4).unwrap();
        let _ = cart.add(c.clone(), 3);
        cart.add(c.clone(), 1).unwrap();
        cart.update_quantity(a.id, 7).unwrap();
        let _ = cart.update_quantity(b.id, 9);
        cart.remove(c.id);
        cart.add(a.clone(), 1).unwrap();

        let expected_total: Decimal = cart
            .items()
            .iter()
            .map(|i| i.product.price.amount * Decimal::from(i.quantity))
            .sum();
        let expected_count: u32 = cart.items().iter().map(|i| i.quantity).sum();
        assert_eq!(cart.total().amount, expected_total);
        assert_eq!(cart.count(), expected_count);
        assert_eq!(cart.count(), 12);
        assert_eq!(cart.total().amount, dec!(74));
    }

    #[test]
    fn test_panel_visibility() {
        let mut cart = Cart::new();
        assert!(!cart.is_open());
        cart.open();
        assert!(cart.is_open());
        cart.close();
        assert!(!cart.is_open());
    }

    #[test]
    fn test_remove_reports_presence() {
        let a = product("A", dec!(1), 1);
        let mut cart = Cart::new();
        assert!(!cart.remove(a.id));
        cart.add(a.clone(), 1).unwrap();
        assert!(cart.remove(a.id));
    }
}
