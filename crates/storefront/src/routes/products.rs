//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use bottleshop_core::catalog::ALL_CATEGORIES;
use bottleshop_core::{Product, ProductId};

use crate::error::AppError;
use crate::filters;
use crate::middleware::PageContext;
use crate::models::Flash;
use crate::state::AppState;

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: PageContext,
    pub products: Vec<Product>,
    pub categories: Vec<String>,
    pub selected: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: Product,
    /// Units of this product already in the cart.
    pub in_cart: u32,
}

/// Not-found page, rendered inside the normal layout.
#[derive(Template, WebTemplate)]
#[template(path = "errors/not_found.html")]
pub struct NotFoundTemplate {
    pub page: PageContext,
    pub message: String,
}

/// Render the not-found view with a 404 status.
pub fn not_found(page: PageContext, message: impl Into<String>) -> Response {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            page,
            message: message.into(),
        },
    )
        .into_response()
}

/// Display the product listing, optionally filtered by category.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    mut page: PageContext,
    Query(query): Query<ProductsQuery>,
) -> impl IntoResponse {
    let selected = query
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| ALL_CATEGORIES.to_string());

    let catalog = state.catalog();
    let loaded = match catalog.products_by_category(&selected).await {
        Ok(products) => catalog
            .category_names()
            .await
            .map(|categories| (products, categories)),
        Err(e) => Err(e),
    };

    let (products, categories) = loaded.unwrap_or_else(|e| {
        tracing::error!("Failed to load products: {e}");
        page.flashes
            .push(Flash::error("Failed to load products").with_message(e.user_message()));
        (Vec::new(), vec![ALL_CATEGORIES.to_string()])
    });

    ProductsIndexTemplate {
        page,
        products,
        categories,
        selected,
    }
}

/// Display a single product.
///
/// Unknown and malformed ids both render the not-found view.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Ok(id) = ProductId::parse(&id) else {
        return Ok(not_found(page, "Product not found"));
    };

    let Some(product) = state.catalog().product_by_id(id).await? else {
        return Ok(not_found(page, "Product not found"));
    };

    let in_cart = page.cart.get(id).map_or(0, |item| item.quantity);

    Ok(ProductShowTemplate {
        page,
        product,
        in_cart,
    }
    .into_response())
}
