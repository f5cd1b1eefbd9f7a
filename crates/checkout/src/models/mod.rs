//! Domain models for the checkout ledger.
//!
//! Nothing in here touches the database. The repositories in [`crate::db`]
//! call into these types so that SKU and order-number assignment, line
//! totals and order totals are computed the same way everywhere.

pub mod cart;
pub mod customer;
pub mod line_item;
pub mod order;
pub mod product;

pub use cart::Cart;
pub use customer::{CustomerDetails, CustomerDetailsError};
pub use line_item::{OrderLineItem, line_total};
pub use order::{NewOrder, Order};
pub use product::{AdoptionPackage, CatalogRef, GameEdition, NewProduct, Product, ProductKind};
