//! Session cart flows: adding within stock, rejecting beyond it, updating
//! quantities, and the simulated checkout.
//!
//! Each test starts its own fake backend and storefront, so they run in
//! parallel without sharing state.

use bottleshop_integration_tests::{Storefront, location};

const NOT_ENOUGH_STOCK: &str = "enough stock for this item";

async fn add(storefront: &Storefront, product_id: &str, quantity: &str) -> reqwest::Response {
    storefront
        .post_form(
            "/cart/add",
            &[
                ("product_id", product_id),
                ("quantity", quantity),
                ("return_to", "/products"),
            ],
        )
        .await
}

#[tokio::test]
async fn test_add_within_stock_then_reject_beyond_it() {
    let (storefront, backend) = Storefront::with_backend().await;
    let id = backend.add_product("Harbour Rum", "spirits", "20.00", Some(1));

    let response = add(&storefront, &id, "1").await;
    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/products"));

    let (_, cart) = storefront.page("/cart").await;
    assert!(cart.contains("Added to cart"));
    assert!(cart.contains("Harbour Rum"));
    assert!(cart.contains("$20.00"));

    add(&storefront, &id, "1").await;
    let (_, cart) = storefront.page("/cart").await;
    assert!(cart.contains(NOT_ENOUGH_STOCK), "second add should be refused");
    // Quantity and total are unchanged by the refused add
    assert!(cart.contains("$20.00"));
    assert!(!cart.contains("$40.00"));

    let (_, badge) = storefront.page("/cart/count").await;
    assert!(badge.contains(">1<"));
}

#[tokio::test]
async fn test_add_more_than_stock_at_once_is_rejected() {
    let (storefront, backend) = Storefront::with_backend().await;
    let id = backend.add_product("Valley Merlot", "wine", "18.50", Some(2));

    add(&storefront, &id, "3").await;

    let (_, cart) = storefront.page("/cart").await;
    assert!(cart.contains(NOT_ENOUGH_STOCK));
    assert!(cart.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_untracked_product_cannot_be_added() {
    let (storefront, backend) = Storefront::with_backend().await;
    let id = backend.add_product("Mystery Mead", "other", "12.00", None);

    add(&storefront, &id, "1").await;

    let (_, cart) = storefront.page("/cart").await;
    assert!(cart.contains(NOT_ENOUGH_STOCK));
}

#[tokio::test]
async fn test_add_unknown_product_flashes_not_found() {
    let (storefront, _backend) = Storefront::with_backend().await;

    add(&storefront, "00000000-0000-4000-8000-000000000000", "1").await;

    let (_, cart) = storefront.page("/cart").await;
    assert!(cart.contains("Product not found"));
}

#[tokio::test]
async fn test_update_to_zero_removes_item() {
    let (storefront, backend) = Storefront::with_backend().await;
    let id = backend.add_product("Dockside Lager", "beer", "3.25", Some(24));

    add(&storefront, &id, "2").await;
    let (_, cart) = storefront.page("/cart").await;
    assert!(cart.contains("$6.50"));

    storefront
        .post_form("/cart/update", &[("product_id", id.as_str()), ("quantity", "5")])
        .await;
    let (_, cart) = storefront.page("/cart").await;
    assert!(cart.contains("$16.25"));

    storefront
        .post_form("/cart/update", &[("product_id", id.as_str()), ("quantity", "0")])
        .await;
    let (_, cart) = storefront.page("/cart").await;
    assert!(cart.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_remove_and_clear() {
    let (storefront, backend) = Storefront::with_backend().await;
    let gin = backend.add_product("Coastal Gin", "spirits", "32.00", Some(5));
    let ale = backend.add_product("Amber Ale", "beer", "4.00", Some(5));

    add(&storefront, &gin, "1").await;
    add(&storefront, &ale, "1").await;

    storefront
        .post_form("/cart/remove", &[("product_id", gin.as_str())])
        .await;
    let (_, cart) = storefront.page("/cart").await;
    assert!(cart.contains("Item removed from cart"));
    assert!(!cart.contains("Coastal Gin"));
    assert!(cart.contains("Amber Ale"));

    let response = storefront.post_form("/cart/clear", &[]).await;
    assert_eq!(location(&response).as_deref(), Some("/cart"));
    let (_, cart) = storefront.page("/cart").await;
    assert!(cart.contains("Cart cleared"));
    assert!(cart.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_checkout_clears_cart() {
    let (storefront, backend) = Storefront::with_backend().await;
    let id = backend.add_product("Highland Single Malt", "spirits", "65.00", Some(3));

    add(&storefront, &id, "2").await;

    let response = storefront.post_form("/checkout", &[]).await;
    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/"));

    let (_, home) = storefront.page("/").await;
    assert!(home.contains("Order placed successfully!"));

    let (_, badge) = storefront.page("/cart/count").await;
    assert!(!badge.contains("cart-count"));

    // Checkout is simulated: stock is not decremented
    let inventory = backend.rows("inventory");
    assert_eq!(inventory.first().map(|row| row["quantity"].clone()), Some(3.into()));
}

#[tokio::test]
async fn test_checkout_with_empty_cart_is_refused() {
    let (storefront, _backend) = Storefront::with_backend().await;

    let response = storefront.post_form("/checkout", &[]).await;
    assert_eq!(location(&response).as_deref(), Some("/cart"));

    let (_, cart) = storefront.page("/cart").await;
    assert!(cart.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_cart_is_kept_per_session() {
    let (storefront, backend) = Storefront::with_backend().await;
    let id = backend.add_product("Harbour Rum", "spirits", "20.00", Some(10));
    let other_visitor = storefront.new_visitor();

    add(&storefront, &id, "1").await;

    let (_, mine) = storefront.page("/cart/count").await;
    let (_, theirs) = other_visitor.page("/cart/count").await;
    assert!(mine.contains(">1<"));
    assert!(!theirs.contains("cart-count"));
}
