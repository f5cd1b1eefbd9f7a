//! Critter Games checkout library.
//!
//! Products, orders and order line items for the shop, stored in the
//! `checkout` `PostgreSQL` schema. Order and line totals are always derived
//! from product prices, never entered by hand.
//!
//! ```rust,ignore
//! let pool = db::create_pool(&CheckoutConfig::from_env()?).await?;
//! let order = CheckoutService::new(&pool).place_order(request).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::{CheckoutConfig, ConfigError};
pub use error::CheckoutError;
pub use services::{CheckoutService, OrderDetails, PlaceOrder};
