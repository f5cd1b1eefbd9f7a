//! Integration tests for placing and maintaining orders.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - `CHECKOUT_DATABASE_URL` pointing at a database the tests may write to
//!
//! Run with: cargo test -p critter-games-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use sqlx::PgPool;

use critter_games_checkout::db::{
    CatalogRepository, LineItemRepository, OrderRepository, ProductRepository, RepositoryError,
};
use critter_games_checkout::models::{Cart, NewOrder};
use critter_games_checkout::{CheckoutError, CheckoutService, PlaceOrder};
use critter_games_core::{Money, OrderNumber, ProductId, Sku};
use critter_games_integration_tests::{
    adoption_product, customer, edition_product, test_pool, unique_stripe_pid,
};

async fn pool() -> PgPool {
    test_pool().await.expect("Failed to prepare test database")
}

fn money(s: &str) -> Money {
    s.parse().unwrap()
}

fn request(cart: Cart, stripe_pid: &str) -> PlaceOrder {
    PlaceOrder {
        customer: customer().unwrap(),
        cart,
        user_profile_id: None,
        stripe_pid: stripe_pid.to_string(),
    }
}

// ============================================================================
// Placing orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_place_order_creates_items_and_totals() {
    let pool = pool().await;
    let game = edition_product(&pool, "Azul", money("19.99")).await.unwrap();
    let adoption = adoption_product(&pool, "red panda", "Gold Adoption", money("5.00"))
        .await
        .unwrap();

    let mut cart = Cart::new();
    cart.add(game.id, 3);
    cart.add(adoption.id, 2);
    let stripe_pid = unique_stripe_pid();

    let service = CheckoutService::new(&pool);
    let order = service
        .place_order(request(cart.clone(), &stripe_pid))
        .await
        .unwrap();

    assert_eq!(order.order_number().as_str().len(), 32);
    assert_eq!(order.order_total, money("69.97"));
    assert_eq!(order.grand_total, order.order_total);
    assert_eq!(Cart::from_snapshot(&order.original_cart).unwrap(), cart);

    let details = service.order_with_items(order.order_number()).await.unwrap();
    assert_eq!(details.items.len(), 2);
    let game_item = details
        .items
        .iter()
        .find(|item| item.product_id == game.id)
        .unwrap();
    assert_eq!(game_item.quantity, 3);
    assert_eq!(game_item.lineitem_total, money("59.97"));

    let found = service.find_by_stripe_pid(&stripe_pid).await.unwrap();
    assert_eq!(found.map(|o| o.id), Some(order.id));
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_missing_product_leaves_no_order() {
    let pool = pool().await;
    let game = edition_product(&pool, "Carcassonne", money("30.00"))
        .await
        .unwrap();

    let mut cart = Cart::new();
    cart.add(game.id, 1);
    cart.add(ProductId::new(i32::MAX), 1);
    let stripe_pid = unique_stripe_pid();

    let service = CheckoutService::new(&pool);
    let err = service
        .place_order(request(cart, &stripe_pid))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::ProductNotFound(id) if id == ProductId::new(i32::MAX)));
    assert!(service.find_by_stripe_pid(&stripe_pid).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_empty_cart_is_rejected() {
    let pool = pool().await;
    let err = CheckoutService::new(&pool)
        .place_order(request(Cart::new(), &unique_stripe_pid()))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
}

// ============================================================================
// Totals and order numbers
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_order_without_items_totals_zero() {
    let pool = pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let mut orders = OrderRepository::new(&mut conn);

    let mut order = orders.insert(NewOrder::new(customer().unwrap())).await.unwrap();
    orders.update_total(&mut order).await.unwrap();

    let stored = orders.get(order.id).await.unwrap().unwrap();
    assert_eq!(stored.order_total.to_string(), "0.00");
    assert_eq!(stored.grand_total.to_string(), "0.00");
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_order_number_survives_saves() {
    let pool = pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let mut orders = OrderRepository::new(&mut conn);

    let mut order = orders.insert(NewOrder::new(customer().unwrap())).await.unwrap();
    let number = order.order_number().clone();

    order.customer.first_name = "Augusta".to_string();
    orders.save(&order).await.unwrap();
    orders.update_total(&mut order).await.unwrap();

    let stored = orders.get_by_number(&number).await.unwrap().unwrap();
    assert_eq!(stored.id, order.id);
    assert_eq!(stored.order_number(), &number);
    assert_eq!(stored.customer.first_name, "Augusta");
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_duplicate_order_number_conflicts() {
    let pool = pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let mut orders = OrderRepository::new(&mut conn);

    let number = OrderNumber::generate();
    orders
        .insert(NewOrder::new(customer().unwrap()).with_order_number(number.clone()))
        .await
        .unwrap();
    let err = orders
        .insert(NewOrder::new(customer().unwrap()).with_order_number(number))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::Conflict(_)));
}

// ============================================================================
// Editing line items
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_line_item_edits_recompute_total() {
    let pool = pool().await;
    let game = edition_product(&pool, "Patchwork", money("10.00")).await.unwrap();
    let other = edition_product(&pool, "Cascadia", money("2.50")).await.unwrap();

    let mut cart = Cart::new();
    cart.add(game.id, 1);
    let service = CheckoutService::new(&pool);
    let order = service
        .place_order(request(cart, &unique_stripe_pid()))
        .await
        .unwrap();
    let number = order.order_number().clone();

    let added = service.add_line_item(&number, other.id, 4).await.unwrap();
    assert_eq!(added.lineitem_total, money("10.00"));
    let details = service.order_with_items(&number).await.unwrap();
    assert_eq!(details.order.order_total, money("20.00"));

    let changed = service
        .change_quantity(&number, added.id, 2)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(changed.lineitem_total, money("5.00"));
    let details = service.order_with_items(&number).await.unwrap();
    assert_eq!(details.order.order_total, money("15.00"));

    let removed = service.change_quantity(&number, added.id, 0).await.unwrap();
    assert!(removed.is_none());
    let details = service.order_with_items(&number).await.unwrap();
    assert_eq!(details.items.len(), 1);
    assert_eq!(details.order.order_total, money("10.00"));
    assert_eq!(details.order.grand_total, money("10.00"));
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_recalculate_picks_up_new_prices() {
    let pool = pool().await;
    let game = edition_product(&pool, "Root", money("40.00")).await.unwrap();

    let mut cart = Cart::new();
    cart.add(game.id, 2);
    let service = CheckoutService::new(&pool);
    let order = service
        .place_order(request(cart, &unique_stripe_pid()))
        .await
        .unwrap();
    assert_eq!(order.order_total, money("80.00"));

    {
        let mut conn = pool.acquire().await.unwrap();
        ProductRepository::new(&mut conn)
            .update_price(game.id, money("35.50"))
            .await
            .unwrap();
    }

    let recalculated = service.recalculate(order.order_number()).await.unwrap();
    assert_eq!(recalculated.order_total, money("71.00"));
    assert_eq!(recalculated.order_number(), order.order_number());
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_concurrent_additions_keep_total_in_step() {
    let pool = pool().await;
    let game = edition_product(&pool, "Takenoko", money("3.25")).await.unwrap();

    let mut cart = Cart::new();
    cart.add(game.id, 1);
    let service = CheckoutService::new(&pool);
    let order = service
        .place_order(request(cart, &unique_stripe_pid()))
        .await
        .unwrap();
    let number = order.order_number().clone();

    let (a, b, c, d) = tokio::join!(
        service.add_line_item(&number, game.id, 1),
        service.add_line_item(&number, game.id, 2),
        service.add_line_item(&number, game.id, 3),
        service.add_line_item(&number, game.id, 4),
    );
    for added in [a, b, c, d] {
        added.unwrap();
    }

    let details = service.order_with_items(&number).await.unwrap();
    assert_eq!(details.items.len(), 5);
    let sum = Money::try_sum(details.items.iter().map(|item| item.lineitem_total)).unwrap();
    assert_eq!(sum, money("35.75"));
    assert_eq!(details.order.order_total, sum);
    assert_eq!(details.order.grand_total, sum);
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_unknown_order_number() {
    let pool = pool().await;
    let err = CheckoutService::new(&pool)
        .recalculate(&OrderNumber::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::OrderNotFound(_)));
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_deleting_order_removes_its_line_items() {
    let pool = pool().await;
    let game = edition_product(&pool, "Jaipur", money("15.00")).await.unwrap();

    let mut cart = Cart::new();
    cart.add(game.id, 2);
    let order = CheckoutService::new(&pool)
        .place_order(request(cart, &unique_stripe_pid()))
        .await
        .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(
        LineItemRepository::new(&mut conn)
            .list_for_order(order.id)
            .await
            .unwrap()
            .len(),
        1
    );

    OrderRepository::new(&mut conn).delete(order.id).await.unwrap();

    assert!(OrderRepository::new(&mut conn).get(order.id).await.unwrap().is_none());
    assert!(
        LineItemRepository::new(&mut conn)
            .list_for_order(order.id)
            .await
            .unwrap()
            .is_empty()
    );
    let err = OrderRepository::new(&mut conn)
        .delete(order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_deleting_catalog_record_removes_products_and_line_items() {
    let pool = pool().await;
    let game = edition_product(&pool, "Tokaido", money("12.00")).await.unwrap();
    let adoption = adoption_product(&pool, "otter", "Silver Adoption", money("4.00"))
        .await
        .unwrap();

    let mut cart = Cart::new();
    cart.add(game.id, 1);
    cart.add(adoption.id, 2);
    let service = CheckoutService::new(&pool);
    let order = service
        .place_order(request(cart, &unique_stripe_pid()))
        .await
        .unwrap();
    assert_eq!(order.order_total, money("20.00"));

    {
        let mut conn = pool.acquire().await.unwrap();
        CatalogRepository::new(&mut conn)
            .delete(game.kind.catalog_ref())
            .await
            .unwrap();
        assert!(ProductRepository::new(&mut conn).get(game.id).await.unwrap().is_none());
    }

    let details = service.order_with_items(order.order_number()).await.unwrap();
    assert_eq!(details.items.len(), 1);
    assert_eq!(details.items[0].product_id, adoption.id);

    let recalculated = service.recalculate(order.order_number()).await.unwrap();
    assert_eq!(recalculated.order_total, money("8.00"));
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_product_found_by_sku() {
    let pool = pool().await;
    let game = edition_product(&pool, "Hanabi", money("9.99")).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let mut products = ProductRepository::new(&mut conn);
    let found = products.get_by_sku(&game.sku).await.unwrap().unwrap();
    assert_eq!(found.id, game.id);
    assert_eq!(found.price, money("9.99"));
    assert_eq!(found.kind, game.kind);

    assert!(products.get_by_sku(&Sku::generate()).await.unwrap().is_none());
}

// ============================================================================
// Profiles
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_profile_orders_newest_first() {
    let pool = pool().await;
    let mut conn = pool.acquire().await.unwrap();

    let profile = CatalogRepository::new(&mut conn)
        .insert_user_profile()
        .await
        .unwrap();
    let mut ids = Vec::new();
    for _ in 0..2 {
        let mut new_order = NewOrder::new(customer().unwrap());
        new_order.user_profile_id = Some(profile);
        ids.push(OrderRepository::new(&mut conn).insert(new_order).await.unwrap().id);
    }
    OrderRepository::new(&mut conn)
        .insert(NewOrder::new(customer().unwrap()))
        .await
        .unwrap();

    let listed: Vec<_> = OrderRepository::new(&mut conn)
        .list_for_profile(profile)
        .await
        .unwrap()
        .into_iter()
        .map(|order| order.id)
        .collect();
    ids.reverse();
    assert_eq!(listed, ids);
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_deleting_profile_keeps_orders() {
    let pool = pool().await;
    let mut conn = pool.acquire().await.unwrap();

    let profile = CatalogRepository::new(&mut conn)
        .insert_user_profile()
        .await
        .unwrap();
    let mut new_order = NewOrder::new(customer().unwrap());
    new_order.user_profile_id = Some(profile);
    let order = OrderRepository::new(&mut conn)
        .insert(new_order)
        .await
        .unwrap();
    assert_eq!(order.user_profile_id, Some(profile));

    CatalogRepository::new(&mut conn)
        .delete_user_profile(profile)
        .await
        .unwrap();

    let stored = OrderRepository::new(&mut conn)
        .get(order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.user_profile_id, None);
}
