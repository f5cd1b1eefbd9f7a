//! CLI command implementations.

pub mod catalog;
pub mod migrate;
pub mod order;
pub mod product;

use sqlx::PgPool;
use thiserror::Error;

use critter_games_checkout::db::{self, RepositoryError};
use critter_games_checkout::{CheckoutConfig, CheckoutError, ConfigError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Checkout operation failed.
    #[error("{0}")]
    Checkout(#[from] CheckoutError),

    /// Arguments were accepted by clap but do not make sense together.
    #[error("Invalid arguments: {0}")]
    InvalidArgument(String),

    /// Requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Connect to the checkout database using environment configuration.
async fn connect() -> Result<PgPool, CommandError> {
    let config = CheckoutConfig::from_env()?;
    tracing::debug!(?config, "Connecting to checkout database");
    Ok(db::create_pool(&config).await?)
}
