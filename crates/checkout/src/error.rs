//! Checkout service errors.

use thiserror::Error;

use critter_games_core::{LineItemId, ProductId};

use crate::db::RepositoryError;
use crate::models::CustomerDetailsError;

/// Errors returned by [`crate::services::CheckoutService`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Beginning or committing a transaction failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Customer details do not fit the orders table.
    #[error("Invalid customer details: {0}")]
    InvalidCustomer(#[from] CustomerDetailsError),

    /// A cart or line item refers to a product that does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// No order matches the given order number or id.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// No line item matches the given id on this order.
    #[error("Line item not found: {0}")]
    LineItemNotFound(LineItemId),

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The cart snapshot could not be serialized or parsed.
    #[error("Cart snapshot error: {0}")]
    Cart(#[from] serde_json::Error),
}

/// Result type alias for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;
