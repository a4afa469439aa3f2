//! Admin inventory: access control and the add-or-update, edit, delete and
//! create-product actions.

use bottleshop_integration_tests::{FakeBackend, Storefront, location};
use serde_json::Value;

const ADMIN_EMAIL: &str = "manager@bottleshop.test";
const CUSTOMER_EMAIL: &str = "customer@bottleshop.test";
const PASSWORD: &str = "cellar-door";

async fn admin_storefront() -> (Storefront, FakeBackend) {
    let (storefront, backend) = Storefront::with_backend().await;
    backend.add_user(ADMIN_EMAIL, PASSWORD, true);
    storefront.sign_in(ADMIN_EMAIL, PASSWORD).await;
    (storefront, backend)
}

fn inventory_for(backend: &FakeBackend, product_id: &str) -> Vec<Value> {
    backend
        .rows("inventory")
        .into_iter()
        .filter(|row| row["product_id"] == product_id)
        .collect()
}

#[tokio::test]
async fn test_anonymous_visitor_is_sent_to_sign_in() {
    let (storefront, _backend) = Storefront::with_backend().await;

    let response = storefront.get("/admin/inventory").await;
    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/auth"));

    let response = storefront
        .post_form("/admin/inventory", &[("product_id", "x"), ("quantity", "1")])
        .await;
    assert_eq!(location(&response).as_deref(), Some("/auth"));
}

#[tokio::test]
async fn test_non_admin_is_forbidden() {
    let (storefront, backend) = Storefront::with_backend().await;
    backend.add_user(CUSTOMER_EMAIL, PASSWORD, false);
    storefront.sign_in(CUSTOMER_EMAIL, PASSWORD).await;

    let (status, _) = storefront.page("/admin/inventory").await;
    assert_eq!(status, reqwest::StatusCode::FORBIDDEN);

    // The nav link is only shown to admins
    let (_, home) = storefront.page("/").await;
    assert!(!home.contains(r#"href="/admin/inventory""#));
}

#[tokio::test]
async fn test_admin_sees_inventory_table() {
    let (storefront, backend) = admin_storefront().await;
    backend.add_product("Harbour Rum", "spirits", "20.00", Some(4));
    backend.add_product("Untracked Cider", "other", "6.00", None);

    let (status, page) = storefront.page("/admin/inventory").await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert!(page.contains("Harbour Rum"));
    assert!(page.contains("Untracked Cider"));
    assert!(page.contains(r#"href="/admin/inventory""#));

    let (_, filtered) = storefront.page("/admin/inventory?q=cider").await;
    assert!(filtered.contains("Untracked Cider"));
    assert!(!filtered.contains("Harbour Rum"));
}

#[tokio::test]
async fn test_add_inventory_inserts_then_updates() {
    let (storefront, backend) = admin_storefront().await;
    let id = backend.add_product("Orchard Cider", "other", "7.50", None);

    let response = storefront
        .post_form(
            "/admin/inventory",
            &[
                ("product_id", id.as_str()),
                ("quantity", "12"),
                ("low_stock_threshold", "3"),
            ],
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/admin/inventory"));
    let rows = inventory_for(&backend, &id);
    assert_eq!(rows.len(), 1);
    let (_, page) = storefront.page("/admin/inventory").await;
    assert!(page.contains("Inventory Added"));

    storefront
        .post_form(
            "/admin/inventory",
            &[
                ("product_id", id.as_str()),
                ("quantity", "5"),
                ("low_stock_threshold", "2"),
            ],
        )
        .await;
    let rows = inventory_for(&backend, &id);
    assert_eq!(rows.len(), 1, "a second add updates the existing row");
    assert_eq!(rows.first().map(|r| r["quantity"].clone()), Some(5.into()));
    let (_, page) = storefront.page("/admin/inventory").await;
    assert!(page.contains("Inventory Updated"));
}

#[tokio::test]
async fn test_add_inventory_rejects_negative_quantity() {
    let (storefront, backend) = admin_storefront().await;
    let id = backend.add_product("Orchard Cider", "other", "7.50", None);

    let response = storefront
        .post_form(
            "/admin/inventory",
            &[
                ("product_id", id.as_str()),
                ("quantity", "-1"),
                ("low_stock_threshold", "3"),
            ],
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    assert!(inventory_for(&backend, &id).is_empty());
}

#[tokio::test]
async fn test_edit_and_delete_inventory_row() {
    let (storefront, backend) = admin_storefront().await;
    let id = backend.add_product("Harbour Rum", "spirits", "20.00", Some(4));
    let row_id = inventory_for(&backend, &id)
        .first()
        .and_then(|row| row["id"].as_str().map(str::to_string))
        .expect("seeded inventory row");

    let response = storefront
        .post_form(
            &format!("/admin/inventory/{row_id}"),
            &[("quantity", "40"), ("low_stock_threshold", "8")],
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/admin/inventory"));
    let rows = inventory_for(&backend, &id);
    assert_eq!(rows.first().map(|r| r["quantity"].clone()), Some(40.into()));

    storefront
        .post_form(&format!("/admin/inventory/{row_id}/delete"), &[])
        .await;
    assert!(inventory_for(&backend, &id).is_empty());
    let (_, page) = storefront.page("/admin/inventory").await;
    assert!(page.contains("Inventory Deleted"));
}

#[tokio::test]
async fn test_stock_changes_reach_the_storefront() {
    let (storefront, backend) = admin_storefront().await;
    let id = backend.add_product("Harbour Rum", "spirits", "20.00", Some(1));

    // Warm the catalog cache before the write
    let (status, _) = storefront.page(&format!("/products/{id}")).await;
    assert_eq!(status, reqwest::StatusCode::OK);

    storefront
        .post_form(
            "/admin/inventory",
            &[
                ("product_id", id.as_str()),
                ("quantity", "5"),
                ("low_stock_threshold", "2"),
            ],
        )
        .await;

    storefront
        .post_form("/cart/add", &[("product_id", id.as_str()), ("quantity", "3")])
        .await;
    let (_, cart) = storefront.page("/cart").await;
    assert!(cart.contains("Added to cart"));
    assert!(cart.contains("$60.00"));
}

#[tokio::test]
async fn test_create_product_with_initial_stock() {
    let (storefront, backend) = admin_storefront().await;

    let response = storefront
        .post_form(
            "/admin/products",
            &[
                ("name", "Riverbank Pinot Noir"),
                ("brand", "Riverbank"),
                ("category", "wine"),
                ("category_id", ""),
                ("volume", "750"),
                ("alcohol_content", "13.5"),
                ("price", "24.99"),
                ("image", ""),
                ("description", "Light and bright."),
                ("quantity", "6"),
                ("low_stock_threshold", "2"),
            ],
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/admin/inventory"));

    let products = backend.rows("products");
    let created = products
        .iter()
        .find(|row| row["name"] == "Riverbank Pinot Noir")
        .expect("product inserted");
    let id = created["id"].as_str().expect("product id").to_string();
    assert_eq!(inventory_for(&backend, &id).len(), 1);

    let (_, page) = storefront.page("/admin/inventory").await;
    assert!(page.contains("Product Created"));
    assert!(page.contains("Riverbank Pinot Noir"));
}

#[tokio::test]
async fn test_create_product_requires_name_and_price() {
    let (storefront, backend) = admin_storefront().await;

    let response = storefront
        .post_form(
            "/admin/products",
            &[("name", ""), ("category", "wine"), ("price", "cheap")],
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.expect("body");
    assert!(body.contains("Name is required"));
    assert!(backend.rows("products").is_empty());
}
