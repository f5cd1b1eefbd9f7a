//! Cross-crate checks of order, line-item and cart behaviour.
//!
//! No database required.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use critter_games_checkout::models::{
    AdoptionPackage, Cart, GameEdition, Order, OrderLineItem, Product, ProductKind, line_total,
};
use critter_games_core::{
    AdoptionPackageId, GameEditionId, LineItemId, Money, OrderId, OrderNumber, ProductId, Sku,
};
use critter_games_integration_tests::customer;

fn order(id: i32) -> Order {
    Order::from_parts(
        OrderId::new(id),
        OrderNumber::generate(),
        None,
        customer().unwrap(),
        Utc::now(),
        Money::ZERO,
        Money::ZERO,
        String::new(),
        String::new(),
    )
}

fn edition(id: i32, price: Money) -> Product {
    Product {
        id: ProductId::new(id),
        kind: ProductKind::GameEdition(GameEdition {
            id: GameEditionId::new(id),
            friendly_name_full: "Wingspan (Second Edition)".to_string(),
            sku: Sku::parse("ws2e").unwrap(),
        }),
        sku: Sku::generate(),
        price,
    }
}

fn item(id: i32, order_id: OrderId, product: &Product, quantity: i32) -> OrderLineItem {
    let mut item = OrderLineItem {
        id: LineItemId::new(id),
        order_id,
        product_id: product.id,
        quantity,
        lineitem_total: Money::ZERO,
    };
    item.recompute_total(product).unwrap();
    item
}

#[test]
fn test_line_total_example() {
    let price: Money = "19.99".parse().unwrap();
    assert_eq!(line_total(price, 3).unwrap(), "59.97".parse().unwrap());
}

#[test]
fn test_order_without_items_totals_zero() {
    let mut order = order(1);
    order.set_totals(Money::from_cents(1234));
    order.update_total(&[]).unwrap();
    assert_eq!(order.order_total.to_string(), "0.00");
    assert_eq!(order.grand_total.to_string(), "0.00");
}

#[test]
fn test_order_total_follows_price_changes() {
    let mut order = order(7);
    let mut product = edition(1, "10.00".parse().unwrap());
    let mut items = vec![item(1, order.id, &product, 2)];
    order.update_total(&items).unwrap();
    assert_eq!(order.order_total, "20.00".parse().unwrap());

    product.price = "12.50".parse().unwrap();
    items[0].recompute_total(&product).unwrap();
    order.update_total(&items).unwrap();
    assert_eq!(order.order_total, "25.00".parse().unwrap());
    assert_eq!(order.grand_total, order.order_total);
}

#[test]
fn test_oversized_line_leaves_order_total_alone() {
    let mut order = order(4);
    let cheap = edition(1, "10.00".parse().unwrap());
    let mut items = vec![item(1, order.id, &cheap, 1)];
    order.update_total(&items).unwrap();

    let dear = edition(2, Money::new(Money::MAX_AMOUNT).unwrap());
    assert!(line_total(dear.price, 2).is_err());
    items.push(item(2, order.id, &dear, 1));
    items.push(item(3, order.id, &dear, 1));

    assert!(order.update_total(&items).is_err());
    assert_eq!(order.order_total, "10.00".parse().unwrap());
    assert_eq!(order.grand_total, order.order_total);
}

#[test]
fn test_line_item_label_uses_catalog_sku() {
    let order = order(3);
    let product = edition(1, Money::from_cents(100));
    assert_eq!(
        OrderLineItem::label(&product, order.order_number()),
        format!("SKU WS2E on order {}", order.order_number())
    );
}

#[test]
fn test_adoption_display_name() {
    let product = Product {
        id: ProductId::new(2),
        kind: ProductKind::AdoptionPackage(AdoptionPackage {
            id: AdoptionPackageId::new(1),
            animal: "red panda".to_string(),
            friendly_name: "Gold Adoption".to_string(),
            sku: Sku::generate(),
        }),
        sku: Sku::generate(),
        price: Money::from_cents(2500),
    };
    assert_eq!(product.to_string(), "Red Panda Gold Adoption");
}

#[test]
fn test_cart_snapshot_survives_an_order() {
    let mut cart = Cart::new();
    cart.add(ProductId::new(3), 2);
    cart.add(ProductId::new(11), 1);

    let mut order = order(5);
    order.original_cart = cart.to_snapshot().unwrap();

    assert_eq!(order.original_cart, r#"{"3":2,"11":1}"#);
    assert_eq!(Cart::from_snapshot(&order.original_cart).unwrap(), cart);
}

proptest! {
    #[test]
    fn prop_order_total_is_sum_of_line_totals(
        lines in prop::collection::vec((1i32..100_000, 0i32..50), 0..20)
    ) {
        let mut order = order(9);
        let items: Vec<OrderLineItem> = lines
            .iter()
            .enumerate()
            .map(|(i, &(cents, quantity))| {
                let id = i32::try_from(i).unwrap() + 1;
                item(id, order.id, &edition(id, Money::from_cents(cents)), quantity)
            })
            .collect();

        order.update_total(&items).unwrap();

        let expected: Decimal = lines
            .iter()
            .map(|&(cents, quantity)| Decimal::new(i64::from(cents), 2) * Decimal::from(quantity))
            .sum();
        prop_assert_eq!(order.order_total.amount(), expected);
        prop_assert_eq!(order.grand_total, order.order_total);
    }

    #[test]
    fn prop_order_number_survives_total_updates(cents in 0i32..1_000_000) {
        let mut order = order(2);
        let number = order.order_number().clone();
        order.set_totals(Money::from_cents(cents));
        order.update_total(&[]).unwrap();
        prop_assert_eq!(order.order_number(), &number);
    }
}
