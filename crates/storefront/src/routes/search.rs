//! Search route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use bottleshop_core::Product;

use crate::filters;
use crate::middleware::PageContext;
use crate::models::Flash;
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search results page template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub page: PageContext,
    pub query: String,
    pub results: Vec<Product>,
}

/// Search products by name, brand, description and category.
#[instrument(skip(state, page), fields(q = %query.q))]
pub async fn search(
    State(state): State<AppState>,
    mut page: PageContext,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let query = query.q.trim().to_string();

    let results = match state.catalog().search(&query).await {
        Ok(results) => results,
        Err(e) => {
            tracing::error!("Search failed: {e}");
            page.flashes
                .push(Flash::error("Search failed").with_message(e.user_message()));
            Vec::new()
        }
    };

    SearchTemplate {
        page,
        query,
        results,
    }
}
