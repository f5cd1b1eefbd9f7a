//! Critter Games Core - Shared types library.
//!
//! This crate provides common types used across the checkout workspace:
//! - `checkout` - Product, order and line-item ledger backed by `PostgreSQL`
//! - `cli` - Command-line tools for migrations and order maintenance
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access. Enable
//! the `postgres` feature to get `sqlx` encode/decode impls for them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, country codes and
//!   generated order numbers / SKUs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
