//! Cart route handlers.
//!
//! The cart lives entirely in the session. Mutations are form posts that
//! queue a notification and redirect back to where the visitor was.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bottleshop_core::{CartChange, CartError, ProductId};

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::PageContext;
use crate::models::{Flash, load_cart, push_flash, save_cart};
use crate::routes::local_redirect;
use crate::state::AppState;

/// Shown whenever a mutation would exceed the stock on hand.
pub const OUT_OF_STOCK_MESSAGE: &str = "Sorry, we don't have enough stock for this item.";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
    pub return_to: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
    pub return_to: Option<String>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
    pub return_to: Option<String>,
}

/// Forms that only carry a redirect target.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnToForm {
    pub return_to: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display the cart page and mark the panel open.
#[instrument(skip(session, page))]
pub async fn show(session: Session, mut page: PageContext) -> Result<impl IntoResponse, AppError> {
    if !page.cart.is_open() {
        page.cart.open();
        save_cart(&session, &page.cart).await?;
    }
    Ok(CartShowTemplate { page })
}

/// Close the cart panel.
#[instrument(skip(session, form))]
pub async fn close(
    session: Session,
    Form(form): Form<ReturnToForm>,
) -> Result<Redirect, AppError> {
    let mut cart = load_cart(&session).await;
    cart.close();
    save_cart(&session, &cart).await?;
    Ok(Redirect::to(local_redirect(form.return_to.as_deref(), "/products")))
}

/// Add a product to the cart.
///
/// Stock is re-read from the catalog, so the snapshot in the cart is
/// refreshed on every add.
#[instrument(skip(state, session, form), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect, AppError> {
    let back = Redirect::to(local_redirect(form.return_to.as_deref(), "/products"));

    let product = match ProductId::parse(&form.product_id) {
        Ok(id) => state.catalog().product_by_id(id).await,
        Err(_) => Ok(None),
    };
    let product = match product {
        Ok(Some(product)) => product,
        Ok(None) => {
            push_flash(&session, Flash::error("Product not found")).await;
            return Ok(back);
        }
        Err(e) => {
            tracing::error!("Failed to load product for cart: {e}");
            push_flash(
                &session,
                Flash::error("Failed to add to cart").with_message(e.user_message()),
            )
            .await;
            return Ok(back);
        }
    };

    let mut cart = load_cart(&session).await;
    let name = product.name.clone();
    let flash = match cart.add(product, form.quantity.unwrap_or(1)) {
        Ok(CartChange::Added) => {
            add_breadcrumb("cart", "Added product", Some(&[("product", name.as_str())]));
            Flash::success("Added to cart").with_message(format!("{name} was added to your cart."))
        }
        Ok(_) => Flash::success("Cart updated")
            .with_message(format!("Increased the quantity of {name}.")),
        Err(CartError::InsufficientStock { .. }) => Flash::error(OUT_OF_STOCK_MESSAGE),
        Err(e @ CartError::InvalidQuantity) => Flash::error("Could not add to cart")
            .with_message(e.to_string()),
    };

    save_cart(&session, &cart).await?;
    push_flash(&session, flash).await;
    Ok(back)
}

/// Set the quantity of a cart item. Zero or less removes it.
#[instrument(skip(session, form), fields(product_id = %form.product_id, quantity = form.quantity))]
pub async fn update(
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect, AppError> {
    let back = Redirect::to(local_redirect(form.return_to.as_deref(), "/cart"));
    let Ok(id) = ProductId::parse(&form.product_id) else {
        return Ok(back);
    };

    let mut cart = load_cart(&session).await;
    match cart.update_quantity(id, form.quantity) {
        Ok(CartChange::Removed) => {
            save_cart(&session, &cart).await?;
            push_flash(&session, Flash::info("Item removed from cart")).await;
        }
        Ok(CartChange::Unchanged) => {}
        Ok(_) => save_cart(&session, &cart).await?,
        Err(_) => push_flash(&session, Flash::error(OUT_OF_STOCK_MESSAGE)).await,
    }

    Ok(back)
}

/// Remove a product from the cart.
#[instrument(skip(session, form), fields(product_id = %form.product_id))]
pub async fn remove(
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect, AppError> {
    let back = Redirect::to(local_redirect(form.return_to.as_deref(), "/cart"));
    let Ok(id) = ProductId::parse(&form.product_id) else {
        return Ok(back);
    };

    let mut cart = load_cart(&session).await;
    if cart.remove(id) {
        save_cart(&session, &cart).await?;
        push_flash(&session, Flash::info("Item removed from cart")).await;
    }
    Ok(back)
}

/// Empty the cart.
#[instrument(skip(session, form))]
pub async fn clear(
    session: Session,
    Form(form): Form<ReturnToForm>,
) -> Result<Redirect, AppError> {
    let mut cart = load_cart(&session).await;
    cart.clear();
    save_cart(&session, &cart).await?;
    push_flash(&session, Flash::info("Cart cleared")).await;
    Ok(Redirect::to(local_redirect(form.return_to.as_deref(), "/cart")))
}

/// Cart count badge fragment.
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: load_cart(&session).await.count(),
    }
}

/// Place a simulated order: nothing is charged or stored, the cart is
/// emptied.
#[instrument(skip(session))]
pub async fn checkout(session: Session) -> Result<Redirect, AppError> {
    let mut cart = load_cart(&session).await;

    if cart.is_empty() {
        push_flash(
            &session,
            Flash::error("Your cart is empty").with_message("Add something before checking out."),
        )
        .await;
        return Ok(Redirect::to("/cart"));
    }

    tracing::info!(
        items = cart.items().len(),
        units = cart.count(),
        total = %cart.total(),
        "Simulated order placed"
    );
    add_breadcrumb("checkout", "Order placed", None);

    cart.clear();
    cart.close();
    save_cart(&session, &cart).await?;
    push_flash(&session, Flash::success("Order placed successfully!")).await;
    Ok(Redirect::to("/"))
}
