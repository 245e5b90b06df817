mod common;

use common::setup_pool_with_fixtures;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use pizzeria::db::{CartOperations, RepositoryError, ReviewOperations};
use pizzeria::test_utils::TestFixtures;

fn place_order(pool: &Pool<ConnectionManager<PgConnection>>, fixtures: &TestFixtures) -> i32 {
    let cart_ops = CartOperations::new(pool.clone());
    let cart = cart_ops
        .add_item(
            fixtures.client_id,
            fixtures.pizza_id,
            fixtures.size_small_id,
            &[],
            1,
        )
        .expect("add item");
    cart_ops
        .submit(fixtures.client_id, &cart.price, "1 Test Street")
        .expect("submit cart")
        .order_id
}

#[actix_rt::test]
async fn client_reviews_a_placed_order() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let review_ops = ReviewOperations::new(pool.clone());
    let order_id = place_order(&pool, &fixtures);

    let review = review_ops
        .create_review(fixtures.client_id, order_id, 5, "Great pizza".to_string())
        .expect("create review");
    assert_eq!(review.order_id, order_id);
    assert_eq!(review.rating, 5);

    let listed = review_ops
        .get_reviews(Some(order_id), None, 10)
        .expect("list reviews");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].review_id, review.review_id);
}

#[actix_rt::test]
async fn rating_must_be_one_to_five() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let review_ops = ReviewOperations::new(pool.clone());
    let order_id = place_order(&pool, &fixtures);

    for bad in [0, 6] {
        let err = review_ops
            .create_review(fixtures.client_id, order_id, bad, "x".to_string())
            .expect_err("out of range rating must fail");
        assert!(matches!(err, RepositoryError::ValidationError(_)));
    }
}

#[actix_rt::test]
async fn carts_and_foreign_orders_cannot_be_reviewed() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let cart_ops = CartOperations::new(pool.clone());
    let review_ops = ReviewOperations::new(pool.clone());

    // The cart itself.
    let cart = cart_ops
        .get_or_create_cart(fixtures.client_id)
        .expect("cart");
    let err = review_ops
        .create_review(fixtures.client_id, cart.order_id, 4, "x".to_string())
        .expect_err("reviewing a cart must fail");
    assert!(matches!(err, RepositoryError::ValidationError(_)));

    // Someone else's order.
    let order_id = place_order(&pool, &fixtures);
    let mut conn = pizzeria::db::DbConnection::new(&pool).expect("db connection");
    let other_client_id = pizzeria::test_utils::insert_user(
        conn.connection(),
        "client2@example.com",
        "Client Two",
        pizzeria::models::user::UserRole::Client,
    )
    .expect("seed second client");
    let err = review_ops
        .create_review(other_client_id, order_id, 4, "x".to_string())
        .expect_err("foreign order must not be reviewable");
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[actix_rt::test]
async fn update_and_delete_are_owner_scoped() {
    let (pool, fixtures) = setup_pool_with_fixtures();
    let review_ops = ReviewOperations::new(pool.clone());
    let order_id = place_order(&pool, &fixtures);

    let review = review_ops
        .create_review(fixtures.client_id, order_id, 3, "Fine".to_string())
        .expect("create review");

    let updated = review_ops
        .update_review(review.review_id, fixtures.client_id, Some(4), None)
        .expect("update review");
    assert_eq!(updated.rating, 4);
    assert_eq!(updated.content, "Fine");

    let mut conn = pizzeria::db::DbConnection::new(&pool).expect("db connection");
    let other_client_id = pizzeria::test_utils::insert_user(
        conn.connection(),
        "client2@example.com",
        "Client Two",
        pizzeria::models::user::UserRole::Client,
    )
    .expect("seed second client");

    let err = review_ops
        .update_review(review.review_id, other_client_id, Some(1), None)
        .expect_err("foreign update must fail");
    assert!(matches!(err, RepositoryError::NotFound(_)));
    let err = review_ops
        .delete_review(review.review_id, other_client_id)
        .expect_err("foreign delete must fail");
    assert!(matches!(err, RepositoryError::NotFound(_)));

    review_ops
        .delete_review(review.review_id, fixtures.client_id)
        .expect("delete review");
    let listed = review_ops
        .get_reviews(Some(order_id), None, 10)
        .expect("list reviews");
    assert!(listed.is_empty());
}
