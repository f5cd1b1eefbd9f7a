//! Products: a priced, SKU'd wrapper around one catalog record.
//!
//! A product sells exactly one thing, either a game edition or an adoption
//! package. [`ProductKind`] makes "both" and "neither" unrepresentable.

use core::fmt;

use serde::{Deserialize, Serialize};

use critter_games_core::{AdoptionPackageId, GameEditionId, Money, ProductId, Sku};

/// A board-game edition from the games catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEdition {
    pub id: GameEditionId,
    /// Full display name, e.g. "Wingspan (Second Edition)".
    pub friendly_name_full: String,
    pub sku: Sku,
}

/// An animal adoption package from the adoption catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionPackage {
    pub id: AdoptionPackageId,
    /// Animal being adopted, stored as entered (e.g. "red panda").
    pub animal: String,
    /// Package tier name, e.g. "Gold".
    pub friendly_name: String,
    pub sku: Sku,
}

/// What a product sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductKind {
    GameEdition(GameEdition),
    AdoptionPackage(AdoptionPackage),
}

impl ProductKind {
    /// Customer-facing name.
    ///
    /// Game editions use their full friendly name. Adoption packages read as
    /// the title-cased animal followed by the package name ("Red Panda Gold").
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::GameEdition(edition) => edition.friendly_name_full.clone(),
            Self::AdoptionPackage(package) => {
                format!("{} {}", title_case(&package.animal), package.friendly_name)
            }
        }
    }

    /// SKU of the underlying catalog record (not the product's own SKU).
    #[must_use]
    pub const fn catalog_sku(&self) -> &Sku {
        match self {
            Self::GameEdition(edition) => &edition.sku,
            Self::AdoptionPackage(package) => &package.sku,
        }
    }

    /// Reference to the catalog record, without its details.
    #[must_use]
    pub const fn catalog_ref(&self) -> CatalogRef {
        match self {
            Self::GameEdition(edition) => CatalogRef::GameEdition(edition.id),
            Self::AdoptionPackage(package) => CatalogRef::AdoptionPackage(package.id),
        }
    }
}

/// Foreign-key reference to a catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum CatalogRef {
    GameEdition(GameEditionId),
    AdoptionPackage(AdoptionPackageId),
}

impl CatalogRef {
    /// Split into the two nullable foreign-key columns.
    #[must_use]
    pub const fn columns(self) -> (Option<GameEditionId>, Option<AdoptionPackageId>) {
        match self {
            Self::GameEdition(id) => (Some(id), None),
            Self::AdoptionPackage(id) => (None, Some(id)),
        }
    }
}

/// A product that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub catalog: CatalogRef,
    pub price: Money,
    sku: Option<Sku>,
}

impl NewProduct {
    #[must_use]
    pub const fn new(catalog: CatalogRef, price: Money) -> Self {
        Self {
            catalog,
            price,
            sku: None,
        }
    }

    /// Use a pre-assigned SKU instead of generating one.
    #[must_use]
    pub fn with_sku(mut self, sku: Sku) -> Self {
        self.sku = Some(sku);
        self
    }

    /// Return the SKU, generating one first if none was supplied.
    pub fn ensure_sku(&mut self) -> &Sku {
        self.sku.get_or_insert_with(Sku::generate)
    }

    #[must_use]
    pub const fn sku(&self) -> Option<&Sku> {
        self.sku.as_ref()
    }
}

/// A persisted product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub kind: ProductKind,
    /// Assigned on insert, never rewritten.
    pub sku: Sku,
    pub price: Money,
}

impl Product {
    #[must_use]
    pub fn display_name(&self) -> String {
        self.kind.display_name()
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Upper-case the first letter of every word and lower-case the rest.
///
/// A word is a run of alphabetic characters, so "o'brien" becomes "O'Brien".
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
