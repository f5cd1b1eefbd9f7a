//! Line item repository.
//!
//! Every write computes `lineitem_total` from the product passed in, so a
//! stored total always matches the price it was saved against.

use rust_decimal::Decimal;
use sqlx::PgConnection;

use critter_games_core::{LineItemId, Money, OrderId, ProductId};

use super::RepositoryError;
use crate::models::{OrderLineItem, Product, line_total};

#[derive(sqlx::FromRow)]
struct LineItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    lineitem_total: Decimal,
}

impl TryFrom<LineItemRow> for OrderLineItem {
    type Error = RepositoryError;

    fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LineItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            lineitem_total: Money::new(row.lineitem_total)
                .map_err(|e| RepositoryError::corrupt("line item total", e))?,
        })
    }
}

/// Repository for order line item database operations.
///
/// These methods do not touch the parent order's totals. Follow a write with
/// [`super::OrderRepository::update_total`] in the same transaction.
pub struct LineItemRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> LineItemRepository<'c> {
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert a line item for `quantity` of `product`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Amount` if `price × quantity` is out of range.
    /// Returns `RepositoryError::Database` if the order or product does not
    /// exist or the total does not fit `NUMERIC(6,2)`.
    pub async fn insert(
        &mut self,
        order_id: OrderId,
        product: &Product,
        quantity: i32,
    ) -> Result<OrderLineItem, RepositoryError> {
        let total = line_total(product.price, quantity)?;

        let row = sqlx::query_as::<_, LineItemRow>(
            r"
            INSERT INTO checkout.order_line_items (order_id, product_id, quantity, lineitem_total)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, product_id, quantity, lineitem_total
            ",
        )
        .bind(order_id)
        .bind(product.id)
        .bind(quantity)
        .bind(total)
        .fetch_one(&mut *self.conn)
        .await?;

        tracing::debug!(
            order_id = %order_id,
            product_id = %product.id,
            quantity,
            lineitem_total = %total,
            "Line item created"
        );

        row.try_into()
    }

    /// Recompute the item's total from `product` and persist it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line item no longer exists.
    pub async fn save(
        &mut self,
        item: &mut OrderLineItem,
        product: &Product,
    ) -> Result<(), RepositoryError> {
        item.recompute_total(product)?;

        let result = sqlx::query(
            r"
            UPDATE checkout.order_line_items
            SET product_id = $2, quantity = $3, lineitem_total = $4
            WHERE id = $1
            ",
        )
        .bind(item.id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.lineitem_total)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&mut self, id: LineItemId) -> Result<Option<OrderLineItem>, RepositoryError> {
        let row = sqlx::query_as::<_, LineItemRow>(
            r"
            SELECT id, order_id, product_id, quantity, lineitem_total
            FROM checkout.order_line_items
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        row.map(OrderLineItem::try_from).transpose()
    }

    /// List an order's line items in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_order(
        &mut self,
        order_id: OrderId,
    ) -> Result<Vec<OrderLineItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, LineItemRow>(
            r"
            SELECT id, order_id, product_id, quantity, lineitem_total
            FROM checkout.order_line_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(&mut *self.conn)
        .await?;
        rows.into_iter().map(OrderLineItem::try_from).collect()
    }

    /// Delete a line item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no line item has this id.
    pub async fn delete(&mut self, id: LineItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM checkout.order_line_items WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
