//! Inventory administration route handlers.
//!
//! Every handler takes [`RequireAdmin`]; there is no other admin check.
//! Writes go straight to the backend and redirect back to the list, which
//! re-reads everything.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bottleshop_core::{Category, InventoryId, ProductId, ProductWithInventory, ValidationErrors};

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin};
use crate::models::{AuthState, Flash, push_flash};
use crate::services::inventory::{NewProduct, NewProductFields, StockLevels};
use crate::services::{InventoryService, UpsertOutcome};
use crate::state::AppState;

const INVENTORY_PATH: &str = "/admin/inventory";

// =============================================================================
// Form Types
// =============================================================================

/// Inventory list query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    #[serde(default)]
    pub q: String,
}

/// Add-or-track form data.
#[derive(Debug, Deserialize)]
pub struct AddInventoryForm {
    pub product_id: String,
    pub quantity: String,
    pub low_stock_threshold: String,
}

/// Edit form data.
#[derive(Debug, Deserialize)]
pub struct StockForm {
    pub quantity: String,
    pub low_stock_threshold: String,
}

/// New product form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub category_id: String,
    pub volume: String,
    pub alcohol_content: String,
    pub price: String,
    pub image: String,
    pub description: String,
    pub quantity: String,
    pub low_stock_threshold: String,
}

impl ProductForm {
    fn fields(&self) -> NewProductFields<'_> {
        NewProductFields {
            name: &self.name,
            brand: &self.brand,
            category: &self.category,
            category_id: &self.category_id,
            volume: &self.volume,
            alcohol_content: &self.alcohol_content,
            price: &self.price,
            image: &self.image,
            description: &self.description,
            quantity: &self.quantity,
            low_stock_threshold: &self.low_stock_threshold,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Inventory list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/inventory.html")]
pub struct InventoryTemplate {
    pub page: PageContext,
    pub rows: Vec<ProductWithInventory>,
    pub categories: Vec<Category>,
    pub filter: String,
    /// Errors from the add-or-track form.
    pub stock_errors: ValidationErrors,
    /// Errors from the new product form, with the submitted values.
    pub product_errors: ValidationErrors,
    pub product_form: ProductForm,
}

/// Load the list and render it.
async fn render_inventory(
    state: &AppState,
    auth: &AuthState,
    mut page: PageContext,
    filter: String,
) -> InventoryTemplate {
    let service = InventoryService::new(state.backend(), state.catalog(), auth.access_token());

    let rows = match service.overview(&filter).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to load inventory: {e}");
            page.flashes
                .push(Flash::error("Failed to load inventory data").with_message(e.user_message()));
            Vec::new()
        }
    };

    // Only the product form needs these; an empty list still allows a
    // free-text category.
    let categories = state.catalog().categories().await.unwrap_or_else(|e| {
        tracing::warn!("Failed to load categories: {e}");
        Vec::new()
    });

    InventoryTemplate {
        page,
        rows,
        categories,
        filter,
        stock_errors: ValidationErrors::new(),
        product_errors: ValidationErrors::new(),
        product_form: ProductForm::default(),
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Display every product with its stock, filtered by name, category or brand.
#[instrument(skip_all, fields(user_id = %auth.user.id, q = %query.q))]
pub async fn inventory(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    page: PageContext,
    Query(query): Query<InventoryQuery>,
) -> impl IntoResponse {
    render_inventory(&state, &auth, page, query.q.trim().to_string()).await
}

/// Start tracking a product, or change the stock of a tracked one.
#[instrument(skip_all, fields(user_id = %auth.user.id, product_id = %form.product_id))]
pub async fn add_inventory(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
    mut page: PageContext,
    Form(form): Form<AddInventoryForm>,
) -> Response {
    let product_id = ProductId::parse(&form.product_id);
    let levels = StockLevels::parse(&form.quantity, &form.low_stock_threshold);

    let (product_id, levels) = match (product_id, levels) {
        (Ok(id), Ok(levels)) => (id, levels),
        (id, levels) => {
            let mut errors = levels.err().unwrap_or_default();
            if id.is_err() {
                errors.add("product_id", "Please choose a product");
            }
            page.flashes.push(
                Flash::error("Failed to add inventory data").with_message(errors.to_string()),
            );
            let mut template = render_inventory(&state, &auth, page, String::new()).await;
            template.stock_errors = errors;
            return (StatusCode::UNPROCESSABLE_ENTITY, template).into_response();
        }
    };

    let service = InventoryService::new(state.backend(), state.catalog(), auth.access_token());
    let flash = match service.upsert_for_product(product_id, levels).await {
        Ok(UpsertOutcome::Added) => {
            add_breadcrumb("inventory", "Inventory added", None);
            Flash::success("Inventory Added")
        }
        Ok(UpsertOutcome::Updated) => Flash::success("Inventory Updated"),
        Err(e) => {
            tracing::error!("Failed to add inventory: {e}");
            Flash::error("Failed to add inventory data").with_message(e.user_message())
        }
    };
    push_flash(&session, flash).await;

    Redirect::to(INVENTORY_PATH).into_response()
}

/// Change quantity and threshold of an inventory row.
#[instrument(skip_all, fields(user_id = %auth.user.id, id = %id))]
pub async fn edit_inventory(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<StockForm>,
) -> Redirect {
    let flash = match (
        InventoryId::parse(&id),
        StockLevels::parse(&form.quantity, &form.low_stock_threshold),
    ) {
        (Err(_), _) => Flash::error("Inventory record not found"),
        (Ok(_), Err(errors)) => {
            Flash::error("Failed to update inventory data").with_message(errors.to_string())
        }
        (Ok(id), Ok(levels)) => {
            match InventoryService::new(state.backend(), state.catalog(), auth.access_token())
                .update(id, levels)
                .await
            {
                Ok(_) => Flash::success("Inventory Updated"),
                Err(e) => {
                    tracing::error!("Failed to update inventory: {e}");
                    Flash::error("Failed to update inventory data").with_message(e.user_message())
                }
            }
        }
    };
    push_flash(&session, flash).await;

    Redirect::to(INVENTORY_PATH)
}

/// Delete an inventory row. The product stays, untracked.
#[instrument(skip_all, fields(user_id = %auth.user.id, id = %id))]
pub async fn delete_inventory(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<String>,
) -> Redirect {
    let flash = match InventoryId::parse(&id) {
        Err(_) => Flash::error("Inventory record not found"),
        Ok(id) => match InventoryService::new(state.backend(), state.catalog(), auth.access_token())
            .delete(id)
            .await
        {
            Ok(()) => Flash::success("Inventory Deleted"),
            Err(e) => {
                tracing::error!("Failed to delete inventory: {e}");
                Flash::error("Failed to delete inventory data").with_message(e.user_message())
            }
        },
    };
    push_flash(&session, flash).await;

    Redirect::to(INVENTORY_PATH)
}

/// Create a product, optionally with initial stock.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
    mut page: PageContext,
    Form(form): Form<ProductForm>,
) -> Response {
    let product = match NewProduct::parse(&form.fields()) {
        Ok(product) => product,
        Err(errors) => {
            page.flashes
                .push(Flash::error("Failed to create product").with_message(errors.to_string()));
            let mut template = render_inventory(&state, &auth, page, String::new()).await;
            template.product_errors = errors;
            template.product_form = form;
            return (StatusCode::UNPROCESSABLE_ENTITY, template).into_response();
        }
    };

    let flash = match InventoryService::new(state.backend(), state.catalog(), auth.access_token())
        .create_product(&product)
        .await
    {
        Ok(created) => {
            tracing::info!(product_id = %created.id, "Product created");
            Flash::success("Product Created").with_message(format!("{} was added.", created.name))
        }
        Err(e) => {
            tracing::error!("Failed to create product: {e}");
            Flash::error("Failed to create product").with_message(e.user_message())
        }
    };
    push_flash(&session, flash).await;

    Redirect::to(INVENTORY_PATH).into_response()
}
