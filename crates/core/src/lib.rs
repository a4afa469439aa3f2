//! Bottleshop Core - Domain types and session-local state containers.
//!
//! This crate provides the types shared by every Bottleshop component:
//! - `storefront` - Public-facing shop, auth pages and the admin inventory screen
//! - `cli` - Operator tooling for seeding the catalog and granting admin rights
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no sessions. The hosted backend is reached from the storefront
//! crate; everything here can be unit tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, credentials, products, inventory, profiles
//! - [`cart`] - The cart state container (stock-checked add/update/remove)
//! - [`catalog`] - Linear filters over product lists (category, search, featured)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{Cart, CartChange, CartError, CartItem};
pub use types::*;
