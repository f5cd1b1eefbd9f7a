//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! cg-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CHECKOUT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Checkout migrations: `crates/checkout/migrations/`

use critter_games_checkout::db;

use super::{CommandError, connect};

/// Run checkout database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    db::run_migrations(&pool).await?;
    Ok(())
}
