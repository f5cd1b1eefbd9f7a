//! Catalog records (game editions, adoption packages) and user profiles.
//!
//! The full catalog lives elsewhere in the shop. These operations exist so
//! the ledger can be seeded and tested on its own; catalog SKUs are
//! generated the same way product SKUs are.

use sqlx::PgConnection;

use critter_games_core::{AdoptionPackageId, GameEditionId, Sku, UserProfileId};

use super::RepositoryError;
use crate::models::{AdoptionPackage, CatalogRef, GameEdition};

#[derive(sqlx::FromRow)]
struct GameEditionRow {
    id: i32,
    friendly_name_full: String,
    sku: String,
}

impl TryFrom<GameEditionRow> for GameEdition {
    type Error = RepositoryError;

    fn try_from(row: GameEditionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: GameEditionId::new(row.id),
            friendly_name_full: row.friendly_name_full,
            sku: Sku::parse(&row.sku).map_err(|e| RepositoryError::corrupt("edition sku", e))?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AdoptionPackageRow {
    id: i32,
    animal: String,
    friendly_name: String,
    sku: String,
}

impl TryFrom<AdoptionPackageRow> for AdoptionPackage {
    type Error = RepositoryError;

    fn try_from(row: AdoptionPackageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AdoptionPackageId::new(row.id),
            animal: row.animal,
            friendly_name: row.friendly_name,
            sku: Sku::parse(&row.sku).map_err(|e| RepositoryError::corrupt("package sku", e))?,
        })
    }
}

/// Repository for catalog records referenced by products.
pub struct CatalogRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> CatalogRepository<'c> {
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert a game edition with a freshly generated SKU.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a SKU collision.
    pub async fn insert_game_edition(
        &mut self,
        friendly_name_full: &str,
    ) -> Result<GameEdition, RepositoryError> {
        let row = sqlx::query_as::<_, GameEditionRow>(
            r"
            INSERT INTO checkout.game_editions (friendly_name_full, sku)
            VALUES ($1, $2)
            RETURNING id, friendly_name_full, sku
            ",
        )
        .bind(friendly_name_full)
        .bind(Sku::generate())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| RepositoryError::from_write(e, "game edition sku"))?;

        row.try_into()
    }

    /// Insert an adoption package with a freshly generated SKU.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a SKU collision.
    pub async fn insert_adoption_package(
        &mut self,
        animal: &str,
        friendly_name: &str,
    ) -> Result<AdoptionPackage, RepositoryError> {
        let row = sqlx::query_as::<_, AdoptionPackageRow>(
            r"
            INSERT INTO checkout.adoption_packages (animal, friendly_name, sku)
            VALUES ($1, $2, $3)
            RETURNING id, animal, friendly_name, sku
            ",
        )
        .bind(animal)
        .bind(friendly_name)
        .bind(Sku::generate())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| RepositoryError::from_write(e, "adoption package sku"))?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_game_edition(
        &mut self,
        id: GameEditionId,
    ) -> Result<Option<GameEdition>, RepositoryError> {
        sqlx::query_as::<_, GameEditionRow>(
            "SELECT id, friendly_name_full, sku FROM checkout.game_editions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .map(GameEdition::try_from)
        .transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_adoption_package(
        &mut self,
        id: AdoptionPackageId,
    ) -> Result<Option<AdoptionPackage>, RepositoryError> {
        sqlx::query_as::<_, AdoptionPackageRow>(
            "SELECT id, animal, friendly_name, sku FROM checkout.adoption_packages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .map(AdoptionPackage::try_from)
        .transpose()
    }

    /// Delete a game edition or adoption package.
    ///
    /// Products for the record go with it, and so do their line items.
    /// Totals of the affected orders are left as they were until the order
    /// is recalculated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the record does not exist.
    pub async fn delete(&mut self, catalog: CatalogRef) -> Result<(), RepositoryError> {
        let result = match catalog {
            CatalogRef::GameEdition(id) => {
                sqlx::query("DELETE FROM checkout.game_editions WHERE id = $1")
                    .bind(id)
                    .execute(&mut *self.conn)
                    .await?
            }
            CatalogRef::AdoptionPackage(id) => {
                sqlx::query("DELETE FROM checkout.adoption_packages WHERE id = $1")
                    .bind(id)
                    .execute(&mut *self.conn)
                    .await?
            }
        };
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(catalog = ?catalog, "Catalog record deleted");
        Ok(())
    }

    /// Create an empty user profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_user_profile(&mut self) -> Result<UserProfileId, RepositoryError> {
        let (id,): (i32,) =
            sqlx::query_as("INSERT INTO checkout.user_profiles DEFAULT VALUES RETURNING id")
                .fetch_one(&mut *self.conn)
                .await?;
        Ok(UserProfileId::new(id))
    }

    /// Delete a user profile. Its orders keep existing with no profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile has this id.
    pub async fn delete_user_profile(&mut self, id: UserProfileId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM checkout.user_profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
