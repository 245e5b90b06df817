mod common;

use bigdecimal::BigDecimal;
use common::setup_pool_with_fixtures;
use pizzeria::db::{CartOperations, RepositoryError};
use pizzeria::models::order::OrderStatus;

#[actix_rt::test]
async fn cart_is_created_empty_on_first_access() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool);

    let cart = cart_ops
        .get_or_create_cart(fixtures.client_id)
        .expect("create cart");
    assert_eq!(cart.price, BigDecimal::from(0));
    assert_eq!(cart.weight, 0);
    assert!(cart.lines.is_empty());

    let again = cart_ops
        .get_or_create_cart(fixtures.client_id)
        .expect("fetch cart");
    assert_eq!(again.order_id, cart.order_id, "cart must be reused");
}

#[actix_rt::test]
async fn add_item_prices_line_and_aggregates() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool);

    // Small Margherita: 200 base + 2/g * 15g cheese = 230 per unit.
    let cart = cart_ops
        .add_item(
            fixtures.client_id,
            fixtures.pizza_id,
            fixtures.size_small_id,
            &[],
            2,
        )
        .expect("add item");

    assert_eq!(cart.lines.len(), 1);
    let line = &cart.lines[0];
    assert_eq!(line.price, BigDecimal::from(230));
    assert_eq!(line.weight, 415);
    assert_eq!(line.total_price, BigDecimal::from(460));
    assert_eq!(line.total_weight, 830);
    assert!(!line.is_custom);
    assert_eq!(line.pizza_name, "Margherita");
    assert_eq!(line.size_name, "Small");

    assert_eq!(cart.price, BigDecimal::from(460));
    assert_eq!(cart.weight, 830);
}

#[actix_rt::test]
async fn added_ingredients_mark_line_custom() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool);

    // 230 + 3/g * 10g pepperoni = 260.
    let cart = cart_ops
        .add_item(
            fixtures.client_id,
            fixtures.pizza_id,
            fixtures.size_small_id,
            &[fixtures.pepperoni_id],
            1,
        )
        .expect("add item with extra");

    let line = &cart.lines[0];
    assert!(line.is_custom);
    assert_eq!(line.price, BigDecimal::from(260));
    assert_eq!(line.weight, 425);
    assert_eq!(line.added_ingredient_ids, vec![fixtures.pepperoni_id]);
    assert_eq!(cart.price, BigDecimal::from(260));
}

#[actix_rt::test]
async fn update_item_recomputes_line_and_aggregates() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool);

    let cart = cart_ops
        .add_item(
            fixtures.client_id,
            fixtures.pizza_id,
            fixtures.size_small_id,
            &[],
            1,
        )
        .expect("add item");
    let line_id = cart.lines[0].line_id;

    // Medium Margherita: 300 + 2/g * 20g = 340 per unit.
    let cart = cart_ops
        .update_item(
            fixtures.client_id,
            line_id,
            fixtures.pizza_id,
            fixtures.size_medium_id,
            &[],
            2,
        )
        .expect("update item");

    let line = &cart.lines[0];
    assert_eq!(line.quantity, 2);
    assert_eq!(line.price, BigDecimal::from(340));
    assert_eq!(line.weight, 620);
    assert_eq!(cart.price, BigDecimal::from(680));
    assert_eq!(cart.weight, 1240);
}

#[actix_rt::test]
async fn remove_item_restores_aggregates() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool);

    let cart = cart_ops
        .add_item(
            fixtures.client_id,
            fixtures.pizza_id,
            fixtures.size_small_id,
            &[],
            1,
        )
        .expect("add first line");
    let first_line_id = cart.lines[0].line_id;
    let cart = cart_ops
        .add_item(
            fixtures.client_id,
            fixtures.pizza_id,
            fixtures.size_medium_id,
            &[],
            1,
        )
        .expect("add second line");
    assert_eq!(cart.price, BigDecimal::from(570)); // 230 + 340

    let cart = cart_ops
        .remove_item(fixtures.client_id, first_line_id)
        .expect("remove line");
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.price, BigDecimal::from(340));

    let cart = cart_ops
        .remove_item(fixtures.client_id, cart.lines[0].line_id)
        .expect("remove last line");
    assert!(cart.lines.is_empty());
    assert_eq!(cart.price, BigDecimal::from(0));
    assert_eq!(cart.weight, 0);
}

#[actix_rt::test]
async fn add_item_rejects_nonpositive_quantity() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool);

    let err = cart_ops
        .add_item(
            fixtures.client_id,
            fixtures.pizza_id,
            fixtures.size_small_id,
            &[],
            0,
        )
        .expect_err("zero quantity must fail");
    assert!(matches!(err, RepositoryError::ValidationError(_)));
}

#[actix_rt::test]
async fn add_item_rejects_unavailable_pizza() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool.clone());

    let mut conn = pizzeria::db::DbConnection::new(&pool).expect("db connection");
    let unavailable_id = pizzeria::test_utils::seed_pizza(
        conn.connection(),
        "Sold Out Special",
        pizzeria::models::catalog::ItemState::Unavailable,
        &[],
    )
    .expect("seed pizza");

    let err = cart_ops
        .add_item(
            fixtures.client_id,
            unavailable_id,
            fixtures.size_small_id,
            &[],
            1,
        )
        .expect_err("unavailable pizza must fail");
    assert!(matches!(err, RepositoryError::ValidationError(_)));
}

#[actix_rt::test]
async fn add_item_unknown_size_is_not_found() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool);

    let err = cart_ops
        .add_item(fixtures.client_id, fixtures.pizza_id, 99999, &[], 1)
        .expect_err("unknown size must fail");
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[actix_rt::test]
async fn clients_cannot_touch_each_others_lines() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool.clone());

    let mut conn = pizzeria::db::DbConnection::new(&pool).expect("db connection");
    let other_client_id = pizzeria::test_utils::insert_user(
        conn.connection(),
        "client2@example.com",
        "Client Two",
        pizzeria::models::user::UserRole::Client,
    )
    .expect("seed second client");

    let cart = cart_ops
        .add_item(
            fixtures.client_id,
            fixtures.pizza_id,
            fixtures.size_small_id,
            &[],
            1,
        )
        .expect("add item");
    let line_id = cart.lines[0].line_id;

    let err = cart_ops
        .remove_item(other_client_id, line_id)
        .expect_err("foreign line must not be removable");
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[actix_rt::test]
async fn submit_moves_cart_into_the_pipeline() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool);

    let cart = cart_ops
        .add_item(
            fixtures.client_id,
            fixtures.pizza_id,
            fixtures.size_small_id,
            &[],
            1,
        )
        .expect("add item");

    let order = cart_ops
        .submit(fixtures.client_id, &cart.price, "1 Test Street")
        .expect("submit cart");
    assert_eq!(order.status, OrderStatus::IsBeingFormed);
    assert_eq!(order.address, "1 Test Street");
    assert!(order.order_time.is_some());

    // A fresh cart replaces the submitted one.
    let fresh = cart_ops
        .get_or_create_cart(fixtures.client_id)
        .expect("fresh cart");
    assert_ne!(fresh.order_id, order.order_id);
    assert!(fresh.lines.is_empty());
}

#[actix_rt::test]
async fn submit_with_stale_price_is_rejected() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool);

    cart_ops
        .add_item(
            fixtures.client_id,
            fixtures.pizza_id,
            fixtures.size_small_id,
            &[],
            1,
        )
        .expect("add item");

    let err = cart_ops
        .submit(fixtures.client_id, &BigDecimal::from(999), "1 Test Street")
        .expect_err("stale price must fail");
    assert!(matches!(err, RepositoryError::OutdatedCart { .. }));

    // The cart must be untouched.
    let cart = cart_ops
        .get_or_create_cart(fixtures.client_id)
        .expect("cart");
    assert_eq!(cart.lines.len(), 1);
}

#[actix_rt::test]
async fn submit_reports_an_empty_cart_before_price_staleness() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool);

    // Open an empty cart; its stored price is zero, so any positive
    // expected price also disagrees with it. Emptiness must win.
    cart_ops
        .get_or_create_cart(fixtures.client_id)
        .expect("open cart");

    let err = cart_ops
        .submit(fixtures.client_id, &BigDecimal::from(230), "1 Test Street")
        .expect_err("empty cart must fail");
    assert!(matches!(err, RepositoryError::EmptyCart(_)));
}

#[actix_rt::test]
async fn submit_validates_arguments_and_cart_presence() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool);

    let err = cart_ops
        .submit(fixtures.client_id, &BigDecimal::from(0), "1 Test Street")
        .expect_err("non-positive expected price must fail");
    assert!(matches!(err, RepositoryError::ValidationError(_)));

    let err = cart_ops
        .submit(fixtures.client_id, &BigDecimal::from(230), "   ")
        .expect_err("blank address must fail");
    assert!(matches!(err, RepositoryError::ValidationError(_)));

    // The manager never opened a cart.
    let err = cart_ops
        .submit(fixtures.manager_id, &BigDecimal::from(230), "1 Test Street")
        .expect_err("missing cart must fail");
    assert!(matches!(err, RepositoryError::NotFound(_)));
}
