//! Order inspection and maintenance commands.
//!
//! # Usage
//!
//! ```bash
//! cg-cli order show 3F2A9C0E...
//! cg-cli order recalc 3F2A9C0E...
//! cg-cli order find-payment pi_3Nq...
//! cg-cli order history 12
//! ```

use critter_games_checkout::CheckoutService;
use critter_games_checkout::db::OrderRepository;
use critter_games_core::{OrderNumber, UserProfileId};

use super::{CommandError, connect};

/// Log an order's header and line items.
///
/// # Errors
///
/// Returns `CommandError::Checkout` if the order does not exist.
pub async fn show(order_number: &OrderNumber) -> Result<(), CommandError> {
    let pool = connect().await?;
    let details = CheckoutService::new(&pool)
        .order_with_items(order_number)
        .await?;

    let order = &details.order;
    tracing::info!(
        order_number = %order.order_number(),
        customer = %order.customer.full_name(),
        email = %order.customer.email,
        date = %order.date,
        order_total = %order.order_total,
        grand_total = %order.grand_total,
        stripe_pid = %order.stripe_pid,
        "Order"
    );
    for item in &details.items {
        tracing::info!(
            line_item_id = %item.id,
            product_id = %item.product_id,
            quantity = item.quantity,
            lineitem_total = %item.lineitem_total,
            "Line item"
        );
    }
    Ok(())
}

/// Re-price an order's line items and recompute its totals.
///
/// # Errors
///
/// Returns `CommandError::Checkout` if the order does not exist.
pub async fn recalc(order_number: &OrderNumber) -> Result<(), CommandError> {
    let pool = connect().await?;
    let order = CheckoutService::new(&pool).recalculate(order_number).await?;

    tracing::info!(
        order_number = %order.order_number(),
        order_total = %order.order_total,
        grand_total = %order.grand_total,
        "Order recalculated"
    );
    Ok(())
}

/// Report which order, if any, was created for a payment.
///
/// # Errors
///
/// Returns `CommandError::NotFound` if no order carries this payment id.
pub async fn find_payment(stripe_pid: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let order = CheckoutService::new(&pool)
        .find_by_stripe_pid(stripe_pid)
        .await?
        .ok_or_else(|| CommandError::NotFound(format!("order for payment {stripe_pid}")))?;

    tracing::info!(
        order_number = %order.order_number(),
        grand_total = %order.grand_total,
        "Order found"
    );
    Ok(())
}

/// Log a profile's orders, newest first.
///
/// # Errors
///
/// Returns `CommandError` if the query fails.
pub async fn history(user_profile_id: UserProfileId) -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut conn = pool.acquire().await?;

    let orders = OrderRepository::new(&mut conn)
        .list_for_profile(user_profile_id)
        .await?;
    if orders.is_empty() {
        tracing::info!(user_profile_id = %user_profile_id, "No orders");
    }
    for order in &orders {
        tracing::info!(
            order_number = %order.order_number(),
            date = %order.date,
            grand_total = %order.grand_total,
            "Order"
        );
    }
    Ok(())
}
