//! Wanderkart
//!
//! Wanderkart is the cart pricing engine behind a travel booking storefront: line items, 18% tax,
//! absolute discounts, undoable adds and removals, and persistence of the cart between sessions.

pub mod cart;
pub mod config;
pub mod discounts;
pub mod items;
pub mod money;
pub mod notifications;
pub mod observability;
pub mod persistence;
pub mod prelude;
pub mod pricing;
pub mod store;
pub mod summary;
