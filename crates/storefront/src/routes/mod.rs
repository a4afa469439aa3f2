//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page (featured products)
//! GET  /about                         - About page
//! GET  /contact                       - Contact form
//! POST /contact                       - Contact submission (simulated)
//! POST /theme                         - Toggle light/dark theme
//!
//! # Products
//! GET  /products?category=            - Product listing with category chips
//! GET  /products/{id}                 - Product detail
//! GET  /search?q=                     - Search results
//!
//! # Cart (session only)
//! GET  /cart                          - Cart page (opens the panel)
//! POST /cart/add                      - Add to cart
//! POST /cart/update                   - Set quantity
//! POST /cart/remove                   - Remove item
//! POST /cart/clear                    - Empty the cart
//! POST /cart/close                    - Close the panel
//! GET  /cart/count                    - Cart count badge (fragment)
//! POST /checkout                      - Simulated order
//!
//! # Auth
//! GET  /auth                          - Sign in and register forms
//! POST /auth/login                    - Sign in
//! POST /auth/register                 - Register
//! POST /auth/logout                   - Sign out
//! GET  /profile                       - Profile (requires auth)
//! POST /profile                       - Update profile (requires auth)
//!
//! # Admin (requires admin)
//! GET  /admin/inventory?q=            - Inventory list
//! POST /admin/inventory               - Add or track inventory
//! POST /admin/inventory/{id}          - Edit inventory row
//! POST /admin/inventory/{id}/delete   - Delete inventory row
//! POST /admin/products                - Create product
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod home;
pub mod pages;
pub mod products;
pub mod profile;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/close", post(cart::close))
        .route("/count", get(cart::count))
}

/// Create the auth form routes router.
///
/// Kept separate so the rate limiter can wrap just these.
pub fn auth_form_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/inventory",
            get(admin::inventory).post(admin::add_inventory),
        )
        .route("/inventory/{id}", post(admin::edit_inventory))
        .route("/inventory/{id}/delete", post(admin::delete_inventory))
        .route("/products", post(admin::create_product))
}

/// Create all routes for the storefront, except the rate-limited auth forms.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact).post(pages::submit_contact))
        .route("/theme", post(pages::toggle_theme))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/search", get(search::search))
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        .route("/auth", get(auth::auth_page))
        .route("/auth/logout", post(auth::logout))
        .route("/profile", get(profile::show).post(profile::update))
        .nest("/admin", admin_routes())
}

/// Sanitize a post-redirect target to a local path.
///
/// Anything that isn't an absolute path on this site (including
/// protocol-relative `//host` URLs) falls back to `default`.
#[must_use]
pub fn local_redirect<'a>(target: Option<&'a str>, default: &'a str) -> &'a str {
    match target {
        Some(t) if t.starts_with('/') && !t.starts_with("//") && !t.contains('\\') => t,
        _ => default,
    }
}
