//! Order line items: a quantity of one product within one order.

use serde::{Deserialize, Serialize};

use critter_games_core::{LineItemId, Money, MoneyError, OrderId, OrderNumber, ProductId};

use super::product::Product;

/// `price × quantity`, rounded to two decimal places.
///
/// Quantity is not validated: zero gives a zero total and negative
/// quantities give negative totals.
///
/// # Errors
///
/// Returns `MoneyError::OutOfRange` if the total does not fit a money amount.
pub fn line_total(price: Money, quantity: i32) -> Result<Money, MoneyError> {
    price.times(quantity)
}

/// A persisted line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: LineItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Derived from the product price. Overwritten on every save.
    pub lineitem_total: Money,
}

impl OrderLineItem {
    /// Recompute `lineitem_total` from the product's current price.
    ///
    /// Also repoints the item at `product`, so a caller swapping products
    /// cannot leave a total computed from a different price.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::OutOfRange` if the total does not fit a money
    /// amount. The item is left unchanged.
    pub fn recompute_total(&mut self, product: &Product) -> Result<(), MoneyError> {
        let total = line_total(product.price, self.quantity)?;
        self.product_id = product.id;
        self.lineitem_total = total;
        Ok(())
    }

    /// Human-readable label: `SKU <CATALOG SKU> on order <number>`.
    #[must_use]
    pub fn label(product: &Product, order_number: &OrderNumber) -> String {
        format!(
            "SKU {} on order {}",
            product.kind.catalog_sku().as_str().to_uppercase(),
            order_number
        )
    }
}
