//! Checkout service.
//!
//! Every operation that changes line items locks the parent order row, then
//! recomputes its totals inside the same transaction. Concurrent edits to one
//! order therefore commit totals that match its line items.
//!
//! Catalog deletions and price changes do not go through this service. Orders
//! they touch keep their old totals until [`CheckoutService::recalculate`].

use sqlx::{PgConnection, PgPool};

use critter_games_core::{LineItemId, OrderNumber, ProductId, UserProfileId};

use crate::db::{LineItemRepository, OrderRepository, ProductRepository};
use crate::error::{CheckoutError, Result};
use crate::models::{Cart, CustomerDetails, NewOrder, Order, OrderLineItem, Product};

/// Everything needed to turn a cart into an order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub customer: CustomerDetails,
    pub cart: Cart,
    pub user_profile_id: Option<UserProfileId>,
    /// Payment-processor transaction id.
    pub stripe_pid: String,
}

impl PlaceOrder {
    /// Validate the request and build the order row to insert.
    fn to_new_order(&self) -> Result<NewOrder> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.customer.validate()?;

        let mut order = NewOrder::new(self.customer.clone());
        order.user_profile_id = self.user_profile_id;
        order.original_cart = self.cart.to_snapshot()?;
        order.stripe_pid.clone_from(&self.stripe_pid);
        Ok(order)
    }
}

/// An order together with its line items.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderLineItem>,
}

/// Checkout service.
///
/// Places orders and edits their line items.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order and one line item per cart entry.
    ///
    /// Runs in a single transaction. Nothing is written if any product in
    /// the cart is missing.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no entries.
    /// Returns `CheckoutError::InvalidCustomer` if the customer details do not
    /// fit the orders table.
    /// Returns `CheckoutError::ProductNotFound` if a cart entry refers to a
    /// product that does not exist.
    pub async fn place_order(&self, request: PlaceOrder) -> Result<Order> {
        let new_order = request.to_new_order()?;

        let mut tx = self.pool.begin().await?;

        let mut order = OrderRepository::new(&mut tx).insert(new_order).await?;

        for (product_id, quantity) in request.cart.iter() {
            let Some(product) = ProductRepository::new(&mut tx).get(product_id).await? else {
                tracing::warn!(
                    order_number = %order.order_number(),
                    product_id = %product_id,
                    "Cart refers to a missing product, abandoning order"
                );
                tx.rollback().await?;
                return Err(CheckoutError::ProductNotFound(product_id));
            };

            LineItemRepository::new(&mut tx)
                .insert(order.id, &product, quantity)
                .await?;
        }

        OrderRepository::new(&mut tx).update_total(&mut order).await?;

        tx.commit().await?;

        tracing::info!(
            order_number = %order.order_number(),
            items = request.cart.len(),
            grand_total = %order.grand_total,
            "Order placed"
        );

        Ok(order)
    }

    /// Add a line item to an existing order.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::OrderNotFound` or `CheckoutError::ProductNotFound`
    /// if either does not exist.
    pub async fn add_line_item(
        &self,
        order_number: &OrderNumber,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<OrderLineItem> {
        let mut tx = self.pool.begin().await?;

        let mut order = lock_order(&mut tx, order_number).await?;
        let product = load_product(&mut tx, product_id).await?;

        let item = LineItemRepository::new(&mut tx)
            .insert(order.id, &product, quantity)
            .await?;
        OrderRepository::new(&mut tx).update_total(&mut order).await?;

        tx.commit().await?;
        Ok(item)
    }

    /// Change a line item's quantity. A quantity below one removes it.
    ///
    /// Returns the updated item, or `None` if it was removed.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::LineItemNotFound` if the item is not on this
    /// order.
    pub async fn change_quantity(
        &self,
        order_number: &OrderNumber,
        line_item_id: LineItemId,
        quantity: i32,
    ) -> Result<Option<OrderLineItem>> {
        if quantity < 1 {
            self.remove_line_item(order_number, line_item_id).await?;
            return Ok(None);
        }

        let mut tx = self.pool.begin().await?;

        let mut order = lock_order(&mut tx, order_number).await?;
        let mut item = load_line_item(&mut tx, &order, line_item_id).await?;
        let product = load_product(&mut tx, item.product_id).await?;

        item.quantity = quantity;
        LineItemRepository::new(&mut tx)
            .save(&mut item, &product)
            .await?;
        OrderRepository::new(&mut tx).update_total(&mut order).await?;

        tx.commit().await?;
        Ok(Some(item))
    }

    /// Remove a line item and recompute the order's totals.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::LineItemNotFound` if the item is not on this
    /// order.
    pub async fn remove_line_item(
        &self,
        order_number: &OrderNumber,
        line_item_id: LineItemId,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let mut order = lock_order(&mut tx, order_number).await?;
        let item = load_line_item(&mut tx, &order, line_item_id).await?;

        LineItemRepository::new(&mut tx).delete(item.id).await?;
        OrderRepository::new(&mut tx).update_total(&mut order).await?;

        tx.commit().await?;

        tracing::info!(
            order_number = %order_number,
            line_item_id = %line_item_id,
            "Line item removed"
        );
        Ok(())
    }

    /// Re-save every line item at current product prices, then recompute the
    /// order's totals.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::OrderNotFound` if no order has this number.
    pub async fn recalculate(&self, order_number: &OrderNumber) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let mut order = lock_order(&mut tx, order_number).await?;
        let items = LineItemRepository::new(&mut tx)
            .list_for_order(order.id)
            .await?;

        for mut item in items {
            let product = load_product(&mut tx, item.product_id).await?;
            LineItemRepository::new(&mut tx)
                .save(&mut item, &product)
                .await?;
        }
        OrderRepository::new(&mut tx).update_total(&mut order).await?;

        tx.commit().await?;
        Ok(order)
    }

    /// Look up the order created for a payment, if any.
    ///
    /// Payment webhooks use this to avoid creating an order twice.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the query fails.
    pub async fn find_by_stripe_pid(&self, stripe_pid: &str) -> Result<Option<Order>> {
        if stripe_pid.trim().is_empty() {
            return Ok(None);
        }
        let mut conn = self.pool.acquire().await?;
        let order = OrderRepository::new(&mut conn)
            .get_by_stripe_pid(stripe_pid)
            .await?;
        tracing::debug!(stripe_pid, found = order.is_some(), "Order lookup by payment id");
        Ok(order)
    }

    /// Load an order and its line items.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::OrderNotFound` if no order has this number.
    pub async fn order_with_items(&self, order_number: &OrderNumber) -> Result<OrderDetails> {
        let mut conn = self.pool.acquire().await?;
        let order = load_order(&mut conn, order_number).await?;
        let items = LineItemRepository::new(&mut conn)
            .list_for_order(order.id)
            .await?;
        Ok(OrderDetails { order, items })
    }
}

async fn load_order(conn: &mut PgConnection, order_number: &OrderNumber) -> Result<Order> {
    OrderRepository::new(conn)
        .get_by_number(order_number)
        .await?
        .ok_or_else(|| CheckoutError::OrderNotFound(order_number.to_string()))
}

async fn lock_order(conn: &mut PgConnection, order_number: &OrderNumber) -> Result<Order> {
    OrderRepository::new(conn)
        .lock_by_number(order_number)
        .await?
        .ok_or_else(|| CheckoutError::OrderNotFound(order_number.to_string()))
}

async fn load_product(conn: &mut PgConnection, product_id: ProductId) -> Result<Product> {
    ProductRepository::new(conn)
        .get(product_id)
        .await?
        .ok_or(CheckoutError::ProductNotFound(product_id))
}

async fn load_line_item(
    conn: &mut PgConnection,
    order: &Order,
    line_item_id: LineItemId,
) -> Result<OrderLineItem> {
    LineItemRepository::new(conn)
        .get(line_item_id)
        .await?
        .filter(|item| item.order_id == order.id)
        .ok_or(CheckoutError::LineItemNotFound(line_item_id))
}
