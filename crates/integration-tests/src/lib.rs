//! Integration tests for the Critter Games checkout.
//!
//! # Running Tests
//!
//! ```bash
//! # Pure tests
//! cargo test -p critter-games-integration-tests
//!
//! # Database tests (needs CHECKOUT_DATABASE_URL pointing at a scratch database)
//! cargo test -p critter-games-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `order_totals` - Cross-crate total and cart properties, no I/O
//! - `checkout_orders` - Checkout service against `PostgreSQL`

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use critter_games_checkout::db::{self, CatalogRepository, ProductRepository};
use critter_games_checkout::models::{CatalogRef, CustomerDetails, NewProduct, Product};
use critter_games_checkout::{CheckoutConfig, ConfigError};
use critter_games_core::{CountryCode, Email, Money};

/// Errors while preparing a test database.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("repository: {0}")]
    Repository(#[from] db::RepositoryError),
    #[error("fixture: {0}")]
    Fixture(String),
}

/// Connect using `CHECKOUT_DATABASE_URL` and apply migrations.
///
/// # Errors
///
/// Returns `SetupError` if the database is unreachable or migrations fail.
pub async fn test_pool() -> Result<PgPool, SetupError> {
    let config = CheckoutConfig::from_env()?;
    let pool = db::create_pool(&config).await?;
    db::run_migrations(&pool).await?;
    Ok(pool)
}

/// A customer that passes validation.
///
/// # Errors
///
/// Returns `SetupError::Fixture` if the literal email or country is rejected.
pub fn customer() -> Result<CustomerDetails, SetupError> {
    let email =
        Email::parse("ada@example.com").map_err(|e| SetupError::Fixture(e.to_string()))?;
    let country = CountryCode::parse("GB").map_err(|e| SetupError::Fixture(e.to_string()))?;
    Ok(CustomerDetails {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email,
        phone_number: "+44 20 7946 0000".to_string(),
        street_address1: "12 Analytical Row".to_string(),
        street_address2: None,
        town_or_city: "London".to_string(),
        county: None,
        postcode: "N1 9GU".to_string(),
        country,
    })
}

/// A payment id no other test run will reuse.
#[must_use]
pub fn unique_stripe_pid() -> String {
    format!("pi_{}", Uuid::new_v4().simple())
}

/// Seed a game edition and a product selling it.
///
/// # Errors
///
/// Returns `SetupError` if either insert fails.
pub async fn edition_product(
    pool: &PgPool,
    name: &str,
    price: Money,
) -> Result<Product, SetupError> {
    let mut conn = pool.acquire().await?;
    let edition = CatalogRepository::new(&mut conn)
        .insert_game_edition(name)
        .await?;
    let product = ProductRepository::new(&mut conn)
        .insert(NewProduct::new(CatalogRef::GameEdition(edition.id), price))
        .await?;
    Ok(product)
}

/// Seed an adoption package and a product selling it.
///
/// # Errors
///
/// Returns `SetupError` if either insert fails.
pub async fn adoption_product(
    pool: &PgPool,
    animal: &str,
    package: &str,
    price: Money,
) -> Result<Product, SetupError> {
    let mut conn = pool.acquire().await?;
    let record = CatalogRepository::new(&mut conn)
        .insert_adoption_package(animal, package)
        .await?;
    let product = ProductRepository::new(&mut conn)
        .insert(NewProduct::new(CatalogRef::AdoptionPackage(record.id), price))
        .await?;
    Ok(product)
}
