//! Core types for Grocery Mart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use address::{AddressError, DeliveryAddress};
pub use category::Category;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::*;
