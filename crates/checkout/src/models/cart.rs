//! Shopping cart contents and their JSON snapshot.
//!
//! Orders keep the cart they were built from in `original_cart`, serialized
//! as a JSON object of product id to quantity: `{"3": 2, "7": 1}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use critter_games_core::ProductId;

/// Product quantities in a customer's cart.
///
/// Entries never hold a quantity below one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: BTreeMap<ProductId, i32>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of a product on top of what is already there.
    ///
    /// An entry whose quantity drops to zero or below is removed.
    pub fn add(&mut self, product_id: ProductId, quantity: i32) {
        let current = self.quantity(product_id);
        self.set_quantity(product_id, current.saturating_add(quantity));
    }

    /// Replace the quantity for a product. Zero or less removes it.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i32) {
        if quantity > 0 {
            self.items.insert(product_id, quantity);
        } else {
            self.items.remove(&product_id);
        }
    }

    /// Remove a product, returning its previous quantity.
    pub fn remove(&mut self, product_id: ProductId) -> Option<i32> {
        self.items.remove(&product_id)
    }

    #[must_use]
    pub fn quantity(&self, product_id: ProductId) -> i32 {
        self.items.get(&product_id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total number of units across all products.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.items.values().map(|&q| i64::from(q)).sum()
    }

    /// Entries in ascending product-id order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, i32)> + '_ {
        self.items.iter().map(|(&id, &quantity)| (id, quantity))
    }

    /// Serialize for `Order.original_cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse an `original_cart` snapshot. An empty string is an empty cart.
    ///
    /// Entries with a quantity below one are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is not a JSON object of id to quantity.
    pub fn from_snapshot(snapshot: &str) -> Result<Self, serde_json::Error> {
        if snapshot.trim().is_empty() {
            return Ok(Self::new());
        }
        let raw: BTreeMap<ProductId, i32> = serde_json::from_str(snapshot)?;
        let mut cart = Self::new();
        for (product_id, quantity) in raw {
            cart.set_quantity(product_id, quantity);
        }
        Ok(cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_accumulates() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(3), 2);
        cart.add(ProductId::new(3), 1);
        assert_eq!(cart.quantity(ProductId::new(3)), 3);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_negative_can_remove() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), 1);
        cart.add(ProductId::new(1), -1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.set_quantity(ProductId::new(4), 5);
        cart.set_quantity(ProductId::new(4), 0);
        assert_eq!(cart.quantity(ProductId::new(4)), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_returns_previous() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(9), 4);
        assert_eq!(cart.remove(ProductId::new(9)), Some(4));
        assert_eq!(cart.remove(ProductId::new(9)), None);
    }

    #[test]
    fn test_item_count() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), 2);
        cart.add(ProductId::new(2), 3);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_snapshot_format() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(7), 1);
        cart.add(ProductId::new(3), 2);
        assert_eq!(cart.to_snapshot().unwrap(), r#"{"3":2,"7":1}"#);
    }

    #[test]
    fn test_snapshot_parses_back() {
        let cart = Cart::from_snapshot(r#"{"3": 2, "7": 1}"#).unwrap();
        assert_eq!(
            cart.iter().collect::<Vec<_>>(),
            vec![(ProductId::new(3), 2), (ProductId::new(7), 1)]
        );
        assert_eq!(Cart::from_snapshot(&cart.to_snapshot().unwrap()).unwrap(), cart);
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(Cart::from_snapshot("").unwrap().is_empty());
        assert!(Cart::from_snapshot("{}").unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_drops_non_positive_quantities() {
        let cart = Cart::from_snapshot(r#"{"1": 0, "2": -3, "5": 2}"#).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity(ProductId::new(5)), 2);
    }

    #[test]
    fn test_bad_snapshot() {
        assert!(Cart::from_snapshot("[1, 2]").is_err());
        assert!(Cart::from_snapshot(r#"{"abc": 1}"#).is_err());
    }
}
