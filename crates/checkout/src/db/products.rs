//! Product repository.
//!
//! Products are read joined to their catalog record so callers always get a
//! complete [`ProductKind`].

use rust_decimal::Decimal;
use sqlx::PgConnection;

use critter_games_core::{AdoptionPackageId, GameEditionId, Money, ProductId, Sku};

use super::RepositoryError;
use crate::models::{AdoptionPackage, GameEdition, NewProduct, Product, ProductKind};

macro_rules! select_products {
    () => {
        r"
        SELECT p.id, p.sku, p.price,
               p.game_edition_id, ge.friendly_name_full, ge.sku AS edition_sku,
               p.adoption_package_id, ap.animal, ap.friendly_name, ap.sku AS package_sku
        FROM checkout.products p
        LEFT JOIN checkout.game_editions ge ON ge.id = p.game_edition_id
        LEFT JOIN checkout.adoption_packages ap ON ap.id = p.adoption_package_id
        "
    };
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    sku: String,
    price: Decimal,
    game_edition_id: Option<i32>,
    friendly_name_full: Option<String>,
    edition_sku: Option<String>,
    adoption_package_id: Option<i32>,
    animal: Option<String>,
    friendly_name: Option<String>,
    package_sku: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let kind = match (row.game_edition_id, row.adoption_package_id) {
            (Some(id), None) => ProductKind::GameEdition(GameEdition {
                id: GameEditionId::new(id),
                friendly_name_full: row.friendly_name_full.unwrap_or_default(),
                sku: parse_sku(row.edition_sku.as_deref(), "edition sku")?,
            }),
            (None, Some(id)) => ProductKind::AdoptionPackage(AdoptionPackage {
                id: AdoptionPackageId::new(id),
                animal: row.animal.unwrap_or_default(),
                friendly_name: row.friendly_name.unwrap_or_default(),
                sku: parse_sku(row.package_sku.as_deref(), "package sku")?,
            }),
            _ => {
                return Err(RepositoryError::DataCorruption(format!(
                    "product {} must reference exactly one catalog record",
                    row.id
                )));
            }
        };

        Ok(Self {
            id: ProductId::new(row.id),
            kind,
            sku: parse_sku(Some(&row.sku), "product sku")?,
            price: Money::new(row.price).map_err(|e| RepositoryError::corrupt("price", e))?,
        })
    }
}

fn parse_sku(raw: Option<&str>, what: &str) -> Result<Sku, RepositoryError> {
    let raw = raw.ok_or_else(|| RepositoryError::corrupt(what, "missing"))?;
    Sku::parse(raw).map_err(|e| RepositoryError::corrupt(what, e))
}

/// Repository for product database operations.
pub struct ProductRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ProductRepository<'c> {
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert a product, generating its SKU if none was supplied.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU already exists.
    /// Returns `RepositoryError::Database` if the catalog record is missing
    /// or the price does not fit `NUMERIC(6,2)`.
    pub async fn insert(&mut self, mut product: NewProduct) -> Result<Product, RepositoryError> {
        let sku = product.ensure_sku().clone();
        let (game_edition_id, adoption_package_id) = product.catalog.columns();

        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO checkout.products (game_edition_id, adoption_package_id, sku, price)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(game_edition_id)
        .bind(adoption_package_id)
        .bind(&sku)
        .bind(product.price)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| RepositoryError::from_write(e, "product sku"))?;

        tracing::info!(product_id = id, sku = %sku, price = %product.price, "Product created");

        self.get(ProductId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is inconsistent.
    pub async fn get(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(concat!(select_products!(), "WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    /// Get a product by its SKU.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_sku(&mut self, sku: &Sku) -> Result<Option<Product>, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(concat!(select_products!(), "WHERE p.sku = $1"))
            .bind(sku)
            .fetch_optional(&mut *self.conn)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    /// List all products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&mut self) -> Result<Vec<Product>, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(concat!(select_products!(), "ORDER BY p.id"))
            .fetch_all(&mut *self.conn)
            .await?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    /// Change a product's price.
    ///
    /// Existing line items keep the total they were saved with until they
    /// are saved again.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    pub async fn update_price(
        &mut self,
        id: ProductId,
        price: Money,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE checkout.products SET price = $2 WHERE id = $1")
            .bind(id)
            .bind(price)
            .execute(&mut *self.conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(product_id = %id, price = %price, "Product price updated");
        Ok(())
    }
}
