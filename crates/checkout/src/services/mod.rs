//! Business logic services for checkout.
//!
//! # Services
//!
//! - `checkout` - Turning a cart into an order and keeping its totals in step
//!   with its line items

pub mod checkout;

pub use checkout::{CheckoutService, OrderDetails, PlaceOrder};
