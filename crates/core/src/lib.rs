//! Grocery Mart Core - Shared domain types.
//!
//! This crate provides the types shared by every Grocery Mart component:
//! - `server` - JSON API for the catalog, carts, orders and the admin dashboard
//! - `cli` - Command-line tools for migrations, seeding and admin users
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Optional `sqlx` encoding is available behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, emails, addresses, categories and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
