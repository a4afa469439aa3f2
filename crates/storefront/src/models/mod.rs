//! Session-scoped models for the storefront.
//!
//! Everything here is stored in the visitor's session, never in the backend.

pub mod auth;
pub mod cart;
pub mod flash;

pub use auth::{AuthState, BackendSession, SessionUser};
pub use cart::{load_cart, save_cart};
pub use flash::{Flash, FlashLevel, push_flash, take_flashes};

/// Session keys.
pub mod session_keys {
    /// Signed-in user, cached profile and backend tokens.
    pub const AUTH: &str = "auth";

    /// The visitor's cart.
    pub const CART: &str = "cart";

    /// Pending one-shot notifications.
    pub const FLASHES: &str = "flashes";
}
