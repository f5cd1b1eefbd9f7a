//! Order repository.
//!
//! `order_number` is written by [`OrderRepository::insert`] only. No update
//! statement in this module touches that column.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;

use critter_games_core::{
    CountryCode, Email, Money, OrderId, OrderNumber, UserProfileId,
};

use super::RepositoryError;
use crate::models::{CustomerDetails, NewOrder, Order};

macro_rules! order_columns {
    () => {
        r"
        id, order_number, user_profile_id,
        first_name, last_name, email, phone_number,
        street_address1, street_address2, town_or_city, county, postcode, country,
        date, order_total, grand_total, original_cart, stripe_pid
        "
    };
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    user_profile_id: Option<i32>,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    street_address1: String,
    street_address2: Option<String>,
    town_or_city: String,
    county: Option<String>,
    postcode: String,
    country: String,
    date: DateTime<Utc>,
    order_total: Decimal,
    grand_total: Decimal,
    original_cart: String,
    stripe_pid: String,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let order_number = OrderNumber::parse(&row.order_number)
            .map_err(|e| RepositoryError::corrupt("order number", e))?;
        let email = Email::parse(&row.email).map_err(|e| RepositoryError::corrupt("email", e))?;
        let country =
            CountryCode::parse(&row.country).map_err(|e| RepositoryError::corrupt("country", e))?;

        let customer = CustomerDetails {
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            phone_number: row.phone_number,
            street_address1: row.street_address1,
            street_address2: row.street_address2,
            town_or_city: row.town_or_city,
            county: row.county,
            postcode: row.postcode,
            country,
        };

        Ok(Self::from_parts(
            OrderId::new(row.id),
            order_number,
            row.user_profile_id.map(UserProfileId::new),
            customer,
            row.date,
            Money::new(row.order_total).map_err(|e| RepositoryError::corrupt("order total", e))?,
            Money::new(row.grand_total).map_err(|e| RepositoryError::corrupt("grand total", e))?,
            row.original_cart,
            row.stripe_pid,
        ))
    }
}

/// Treat empty optional address lines as absent.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Repository for order database operations.
pub struct OrderRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> OrderRepository<'c> {
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert an order, generating its order number if none is set.
    ///
    /// Totals start at zero. Call [`Self::update_total`] once line items
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&mut self, mut order: NewOrder) -> Result<Order, RepositoryError> {
        let order_number = order.ensure_order_number().clone();
        let c = &order.customer;

        let row = sqlx::query_as::<_, OrderRow>(concat!(
            r"
            INSERT INTO checkout.orders (
                order_number, user_profile_id,
                first_name, last_name, email, phone_number,
                street_address1, street_address2, town_or_city, county, postcode, country,
                original_cart, stripe_pid
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING ",
            order_columns!()
        ))
        .bind(&order_number)
        .bind(order.user_profile_id)
        .bind(&c.first_name)
        .bind(&c.last_name)
        .bind(&c.email)
        .bind(&c.phone_number)
        .bind(&c.street_address1)
        .bind(non_blank(c.street_address2.as_deref()))
        .bind(&c.town_or_city)
        .bind(non_blank(c.county.as_deref()))
        .bind(&c.postcode)
        .bind(c.country)
        .bind(&order.original_cart)
        .bind(&order.stripe_pid)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| RepositoryError::from_write(e, "order number"))?;

        tracing::info!(order_number = %order_number, order_id = row.id, "Order created");

        row.try_into()
    }

    /// Persist every mutable column of an order.
    ///
    /// The order number is not written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order no longer exists.
    pub async fn save(&mut self, order: &Order) -> Result<(), RepositoryError> {
        let c = &order.customer;
        let result = sqlx::query(
            r"
            UPDATE checkout.orders
            SET user_profile_id = $2,
                first_name = $3, last_name = $4, email = $5, phone_number = $6,
                street_address1 = $7, street_address2 = $8, town_or_city = $9,
                county = $10, postcode = $11, country = $12,
                order_total = $13, grand_total = $14,
                original_cart = $15, stripe_pid = $16
            WHERE id = $1
            ",
        )
        .bind(order.id)
        .bind(order.user_profile_id)
        .bind(&c.first_name)
        .bind(&c.last_name)
        .bind(&c.email)
        .bind(&c.phone_number)
        .bind(&c.street_address1)
        .bind(non_blank(c.street_address2.as_deref()))
        .bind(&c.town_or_city)
        .bind(non_blank(c.county.as_deref()))
        .bind(&c.postcode)
        .bind(c.country)
        .bind(order.order_total)
        .bind(order.grand_total)
        .bind(&order.original_cart)
        .bind(&order.stripe_pid)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::debug!(order_number = %order.order_number(), "Order saved");
        Ok(())
    }

    /// Recompute the order's totals from its stored line items and save.
    ///
    /// `order_total` becomes the sum of `lineitem_total` (zero with no
    /// items) and `grand_total` is set equal to it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order no longer exists.
    /// Returns `RepositoryError::Amount` if the sum does not fit a money
    /// amount.
    pub async fn update_total(&mut self, order: &mut Order) -> Result<(), RepositoryError> {
        let (sum,): (Decimal,) = sqlx::query_as(
            r"
            SELECT COALESCE(SUM(lineitem_total), 0)
            FROM checkout.order_line_items
            WHERE order_id = $1
            ",
        )
        .bind(order.id)
        .fetch_one(&mut *self.conn)
        .await?;

        order.set_totals(Money::new(sum)?);
        self.save(order).await?;

        tracing::info!(
            order_number = %order.order_number(),
            order_total = %order.order_total,
            "Order total updated"
        );
        Ok(())
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(concat!(
            "SELECT ",
            order_columns!(),
            " FROM checkout.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .map(Order::try_from)
        .transpose()
    }

    /// Get an order by its public order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_number(
        &mut self,
        order_number: &OrderNumber,
    ) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(concat!(
            "SELECT ",
            order_columns!(),
            " FROM checkout.orders WHERE order_number = $1"
        ))
        .bind(order_number)
        .fetch_optional(&mut *self.conn)
        .await?
        .map(Order::try_from)
        .transpose()
    }

    /// Get an order by number and lock its row until the transaction ends.
    ///
    /// Writers that change line items take this lock first, so their
    /// `update_total` calls run one at a time per order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock_by_number(
        &mut self,
        order_number: &OrderNumber,
    ) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(concat!(
            "SELECT ",
            order_columns!(),
            " FROM checkout.orders WHERE order_number = $1 FOR UPDATE"
        ))
        .bind(order_number)
        .fetch_optional(&mut *self.conn)
        .await?
        .map(Order::try_from)
        .transpose()
    }

    /// Get the most recent order carrying a payment-processor id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_stripe_pid(
        &mut self,
        stripe_pid: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(concat!(
            "SELECT ",
            order_columns!(),
            " FROM checkout.orders WHERE stripe_pid = $1 AND stripe_pid <> '' ORDER BY id DESC LIMIT 1"
        ))
        .bind(stripe_pid)
        .fetch_optional(&mut *self.conn)
        .await?
        .map(Order::try_from)
        .transpose()
    }

    /// List a profile's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_profile(
        &mut self,
        user_profile_id: UserProfileId,
    ) -> Result<Vec<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(concat!(
            "SELECT ",
            order_columns!(),
            " FROM checkout.orders WHERE user_profile_id = $1 ORDER BY date DESC, id DESC"
        ))
        .bind(user_profile_id)
        .fetch_all(&mut *self.conn)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect()
    }

    /// Delete an order. Its line items are removed with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn delete(&mut self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM checkout.orders WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }
}
