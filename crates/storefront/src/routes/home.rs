//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use bottleshop_core::Product;

use crate::filters;
use crate::middleware::PageContext;
use crate::models::Flash;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub featured: Vec<Product>,
}

/// Display the home page with featured products.
#[instrument(skip(state, page))]
pub async fn home(State(state): State<AppState>, mut page: PageContext) -> impl IntoResponse {
    let featured = match state.catalog().featured_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!("Failed to load featured products: {e}");
            page.flashes
                .push(Flash::error("Failed to load products").with_message(e.user_message()));
            Vec::new()
        }
    };

    HomeTemplate { page, featured }
}
