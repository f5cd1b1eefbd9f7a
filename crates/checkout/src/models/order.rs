//! Orders and their derived totals.
//!
//! # Invariants
//!
//! - `order_total` equals the sum of the order's `lineitem_total`s after
//!   [`Order::update_total`]. It is recomputed, never incremented.
//! - `grand_total` equals `order_total`. No shipping or tax is charged.
//! - The order number is assigned once, on first insert, and is read-only
//!   on [`Order`].

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use critter_games_core::{Money, MoneyError, OrderId, OrderNumber, UserProfileId};

use super::customer::CustomerDetails;
use super::line_item::OrderLineItem;

/// An order that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    order_number: Option<OrderNumber>,
    pub user_profile_id: Option<UserProfileId>,
    pub customer: CustomerDetails,
    /// Serialized cart the order was built from.
    pub original_cart: String,
    /// Payment-processor transaction id.
    pub stripe_pid: String,
}

impl NewOrder {
    #[must_use]
    pub const fn new(customer: CustomerDetails) -> Self {
        Self {
            order_number: None,
            user_profile_id: None,
            customer,
            original_cart: String::new(),
            stripe_pid: String::new(),
        }
    }

    /// Use a pre-assigned order number instead of generating one.
    #[must_use]
    pub fn with_order_number(mut self, order_number: OrderNumber) -> Self {
        self.order_number = Some(order_number);
        self
    }

    /// Return the order number, generating one first if none is set.
    pub fn ensure_order_number(&mut self) -> &OrderNumber {
        self.order_number.get_or_insert_with(OrderNumber::generate)
    }

    #[must_use]
    pub const fn order_number(&self) -> Option<&OrderNumber> {
        self.order_number.as_ref()
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    order_number: OrderNumber,
    pub user_profile_id: Option<UserProfileId>,
    pub customer: CustomerDetails,
    pub date: DateTime<Utc>,
    pub order_total: Money,
    pub grand_total: Money,
    pub original_cart: String,
    pub stripe_pid: String,
}

impl Order {
    /// Assemble an order from stored columns.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_parts(
        id: OrderId,
        order_number: OrderNumber,
        user_profile_id: Option<UserProfileId>,
        customer: CustomerDetails,
        date: DateTime<Utc>,
        order_total: Money,
        grand_total: Money,
        original_cart: String,
        stripe_pid: String,
    ) -> Self {
        Self {
            id,
            order_number,
            user_profile_id,
            customer,
            date,
            order_total,
            grand_total,
            original_cart,
            stripe_pid,
        }
    }

    #[must_use]
    pub const fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    /// Set both totals from an already-summed amount.
    pub fn set_totals(&mut self, order_total: Money) {
        self.order_total = order_total;
        self.grand_total = order_total;
    }

    /// Recompute totals from the order's line items.
    ///
    /// Items belonging to other orders are ignored. No items gives zero.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::OutOfRange` if the sum does not fit a money
    /// amount. The totals are left unchanged.
    pub fn update_total(&mut self, items: &[OrderLineItem]) -> Result<(), MoneyError> {
        let total = Money::try_sum(
            items
                .iter()
                .filter(|item| item.order_id == self.id)
                .map(|item| item.lineitem_total),
        )?;
        self.set_totals(total);
        Ok(())
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.order_number, f)
    }
}
