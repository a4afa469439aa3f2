//! Core types for Bottleshop.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod category;
pub mod credentials;
pub mod id;
pub mod inventory;
pub mod price;
pub mod product;
pub mod profile;
pub mod validation;

pub use category::Category;
pub use credentials::{Email, EmailError, Password, PasswordError};
pub use id::*;
pub use inventory::{InventoryRecord, ProductWithInventory, StockStatus};
pub use price::{CurrencyCode, FEATURED_PRICE_THRESHOLD, Price};
pub use product::{Product, ProductCategory};
pub use profile::{ProfileUpdate, Theme, UserProfile};
pub use validation::{FieldError, ValidationErrors};
