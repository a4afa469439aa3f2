//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `catalog` - Cached product reads (stock merge, featured, filters)
//! - `auth` - Sign in, sign up, sign out, token refresh, profile updates
//! - `inventory` - Admin inventory list and writes
//! - `profiles` - Profile lookups and admin grants

pub mod auth;
pub mod catalog;
pub mod inventory;
pub mod profiles;

pub use auth::{AuthError, AuthService, SignUpOutcome};
pub use catalog::CatalogService;
pub use inventory::{InventoryService, UpsertOutcome};
pub use profiles::ProfileService;
