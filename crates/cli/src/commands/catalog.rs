//! Catalog seeding commands.

use critter_games_checkout::db::CatalogRepository;
use critter_games_checkout::models::CatalogRef;
use critter_games_core::{AdoptionPackageId, GameEditionId};

use super::{CommandError, connect};

/// Add a game edition with a generated SKU.
///
/// # Errors
///
/// Returns `CommandError` if the insert fails.
pub async fn add_edition(name: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut conn = pool.acquire().await?;

    let edition = CatalogRepository::new(&mut conn)
        .insert_game_edition(name)
        .await?;

    tracing::info!(
        id = %edition.id,
        sku = %edition.sku,
        name = %edition.friendly_name_full,
        "Game edition created"
    );
    Ok(())
}

/// Add an adoption package with a generated SKU.
///
/// # Errors
///
/// Returns `CommandError` if the insert fails.
pub async fn add_package(animal: &str, name: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut conn = pool.acquire().await?;

    let package = CatalogRepository::new(&mut conn)
        .insert_adoption_package(animal, name)
        .await?;

    tracing::info!(
        id = %package.id,
        sku = %package.sku,
        animal = %package.animal,
        name = %package.friendly_name,
        "Adoption package created"
    );
    Ok(())
}

/// Delete a game edition or adoption package along with its products.
///
/// Line items for those products are deleted too. Run `order recalc` on
/// affected orders afterwards.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` unless exactly one id is given.
/// Returns `CommandError::Repository` if the record does not exist.
pub async fn remove(
    game_edition: Option<GameEditionId>,
    adoption_package: Option<AdoptionPackageId>,
) -> Result<(), CommandError> {
    let catalog = match (game_edition, adoption_package) {
        (Some(id), None) => CatalogRef::GameEdition(id),
        (None, Some(id)) => CatalogRef::AdoptionPackage(id),
        _ => {
            return Err(CommandError::InvalidArgument(
                "pass exactly one of --game-edition or --adoption-package".to_string(),
            ));
        }
    };

    let pool = connect().await?;
    let mut conn = pool.acquire().await?;
    CatalogRepository::new(&mut conn).delete(catalog).await?;
    Ok(())
}
