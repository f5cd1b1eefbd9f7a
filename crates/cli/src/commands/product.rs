//! Product management commands.
//!
//! # Usage
//!
//! ```bash
//! cg-cli product create --game-edition 1 --price 39.99
//! cg-cli product create --adoption-package 2 --price 25
//! cg-cli product list
//! cg-cli product show 0B1E...
//! cg-cli product set-price 4 --price 42.50
//! ```

use critter_games_checkout::db::{CatalogRepository, ProductRepository};
use critter_games_checkout::models::{CatalogRef, NewProduct};
use critter_games_core::{AdoptionPackageId, GameEditionId, Money, ProductId, Sku};

use super::{CommandError, connect};

/// Create a product for exactly one catalog record.
///
/// The SKU is generated on insert.
///
/// # Errors
///
/// Returns `CommandError::NotFound` if the catalog record does not exist.
pub async fn create(
    game_edition: Option<GameEditionId>,
    adoption_package: Option<AdoptionPackageId>,
    price: Money,
) -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut conn = pool.acquire().await?;

    let catalog = match (game_edition, adoption_package) {
        (Some(id), None) => {
            CatalogRepository::new(&mut conn)
                .get_game_edition(id)
                .await?
                .ok_or_else(|| CommandError::NotFound(format!("game edition {id}")))?;
            CatalogRef::GameEdition(id)
        }
        (None, Some(id)) => {
            CatalogRepository::new(&mut conn)
                .get_adoption_package(id)
                .await?
                .ok_or_else(|| CommandError::NotFound(format!("adoption package {id}")))?;
            CatalogRef::AdoptionPackage(id)
        }
        _ => {
            return Err(CommandError::InvalidArgument(
                "pass exactly one of --game-edition or --adoption-package".to_string(),
            ));
        }
    };

    let product = ProductRepository::new(&mut conn)
        .insert(NewProduct::new(catalog, price))
        .await?;

    tracing::info!(
        id = %product.id,
        sku = %product.sku,
        name = %product,
        price = %product.price,
        "Product created"
    );
    Ok(())
}

/// Log every product with its SKU and price.
///
/// # Errors
///
/// Returns `CommandError` if the query fails.
pub async fn list() -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut conn = pool.acquire().await?;

    let products = ProductRepository::new(&mut conn).list().await?;
    if products.is_empty() {
        tracing::info!("No products");
    }
    for product in &products {
        tracing::info!(
            id = %product.id,
            sku = %product.sku,
            catalog_sku = %product.kind.catalog_sku(),
            price = %product.price,
            "{product}"
        );
    }
    Ok(())
}

/// Look up a product by its SKU.
///
/// # Errors
///
/// Returns `CommandError::NotFound` if no product has this SKU.
pub async fn show(sku: &Sku) -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut conn = pool.acquire().await?;

    let product = ProductRepository::new(&mut conn)
        .get_by_sku(sku)
        .await?
        .ok_or_else(|| CommandError::NotFound(format!("product {sku}")))?;

    tracing::info!(
        id = %product.id,
        catalog_sku = %product.kind.catalog_sku(),
        price = %product.price,
        "{product}"
    );
    Ok(())
}

/// Change a product's price.
///
/// Orders that already contain the product keep their totals until they are
/// recalculated.
///
/// # Errors
///
/// Returns `CommandError::Repository` if the product does not exist.
pub async fn set_price(id: ProductId, price: Money) -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut conn = pool.acquire().await?;

    ProductRepository::new(&mut conn).update_price(id, price).await?;
    Ok(())
}
