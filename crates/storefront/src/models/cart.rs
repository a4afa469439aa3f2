//! The visitor's cart, stored in the session.

use bottleshop_core::Cart;
use tower_sessions::Session;

use super::session_keys;

/// Load the cart, or an empty one if none is stored yet.
pub async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Store the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::dec;
    use tower_sessions::MemoryStore;

    use bottleshop_core::{Price, Product, ProductCategory, ProductId};

    use super::*;

    #[tokio::test]
    async fn test_cart_survives_session_round_trip() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        assert!(load_cart(&session).await.is_empty());

        let product = Product {
            id: ProductId::random(),
            name: "Pale Ale".to_string(),
            brand: "Harbour".to_string(),
            category: ProductCategory::Beer,
            category_id: None,
            volume_ml: 330,
            alcohol_content: dec!(4.8),
            price: Price::usd(dec!(3.50)),
            image: "/static/img/placeholder.svg".to_string(),
            description: String::new(),
            stock: 12,
            featured: false,
        };
        let mut cart = Cart::default();
        cart.add(product, 4).unwrap();
        save_cart(&session, &cart).await.unwrap();

        let loaded = load_cart(&session).await;
        assert_eq!(loaded.count(), 4);
        assert_eq!(loaded.total().amount, dec!(14.00));
    }
}
