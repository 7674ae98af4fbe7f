//! Domain models for the catalog, carts, orders and users.
//!
//! These are validated domain types, separate from database row types and
//! from HTTP request bodies.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartError, CartItemView, CartLine, CartView};
pub use order::{NewOrder, Order, OrderItemView, OrderLine, OrderView};
pub use product::{NewProduct, Product, ProductFilter, ProductPatch};
pub use user::{CustomerSummary, NewUser, User};
