//! Database operations for the checkout `PostgreSQL` schema.
//!
//! # Schema: `checkout`
//!
//! ## Tables
//!
//! - `game_editions` / `adoption_packages` - Catalog records products point at
//! - `user_profiles` - Customer profiles orders may belong to
//! - `products` - Priced, SKU'd catalog records (exactly one catalog reference)
//! - `orders` - Customer details, totals, cart snapshot, payment id
//! - `order_line_items` - Quantity of one product on one order
//!
//! # Repositories
//!
//! Repositories borrow a `&mut PgConnection`, so the same code runs against a
//! pooled connection or inside a transaction:
//!
//! ```rust,ignore
//! let mut tx = pool.begin().await?;
//! let order = OrderRepository::new(&mut tx).insert(new_order).await?;
//! LineItemRepository::new(&mut tx).insert(order.id, &product, 2).await?;
//! tx.commit().await?;
//! ```
//!
//! # Migrations
//!
//! Migrations are stored in `crates/checkout/migrations/` and run via:
//! ```bash
//! cargo run -p critter-games-cli -- migrate
//! ```

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use critter_games_core::MoneyError;

use crate::config::CheckoutConfig;

pub mod catalog;
pub mod line_items;
pub mod orders;
pub mod products;

pub use catalog::CatalogRepository;
pub use line_items::LineItemRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Embedded checkout migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate order number).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A computed total does not fit a money amount.
    #[error("amount out of range: {0}")]
    Amount(#[from] MoneyError),
}

impl RepositoryError {
    /// Map unique violations to `Conflict`, everything else to `Database`.
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }

    pub(crate) fn corrupt(what: &str, err: impl std::fmt::Display) -> Self {
        Self::DataCorruption(format!("invalid {what} in database: {err}"))
    }
}

/// Create a `PostgreSQL` connection pool from checkout configuration.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &CheckoutConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(config.acquire_timeout)
        .connect(config.database_url.expose_secret())
        .await
}

/// Apply any pending checkout migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running checkout migrations");
    MIGRATOR.run(pool).await?;
    tracing::info!("Checkout migrations complete");
    Ok(())
}
