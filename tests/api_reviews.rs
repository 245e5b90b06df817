mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use pizzeria::models::user::UserRole;
use serde_json::Value;

async fn place_order<S, B>(app: &S, fixtures: &pizzeria::test_utils::TestFixtures) -> i64
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let auth = common::auth_header(fixtures.client_id, UserRole::Client);
    let req = test::TestRequest::post()
        .uri("/api/carts")
        .insert_header(auth.clone())
        .set_json(serde_json::json!({
            "pizza_id": fixtures.pizza_id,
            "size_id": fixtures.size_small_id,
            "ingredient_ids": [],
            "quantity": 1
        }))
        .to_request();
    test::call_service(app, req).await;
    let req = test::TestRequest::post()
        .uri("/api/carts/submit")
        .insert_header(auth)
        .set_json(serde_json::json!({
            "expected_price": "230",
            "address": "1 Test Street"
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let body: Value = test::read_body_json(resp).await;
    body["data"]["order_id"].as_i64().expect("order id")
}

#[actix_rt::test]
async fn review_lifecycle_over_http() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;
    let order_id = place_order(&app, &fixtures).await;
    let client = common::auth_header(fixtures.client_id, UserRole::Client);

    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .insert_header(client.clone())
        .set_json(serde_json::json!({
            "order_id": order_id,
            "rating": 5,
            "content": "Great pizza"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let review_id = body["data"]["review_id"].as_i64().expect("review id");

    // Anyone authenticated can read reviews, filtered by order.
    let req = test::TestRequest::get()
        .uri(&format!("/api/reviews?order_id={order_id}"))
        .insert_header(common::auth_header(fixtures.manager_id, UserRole::Manager))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["rating"], 5);

    let req = test::TestRequest::put()
        .uri(&format!("/api/reviews/{review_id}"))
        .insert_header(client.clone())
        .set_json(serde_json::json!({ "rating": 4 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["rating"], 4);
    assert_eq!(body["data"]["content"], "Great pizza");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/reviews/{review_id}"))
        .insert_header(client.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/reviews?order_id={order_id}"))
        .insert_header(client)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
}

#[actix_rt::test]
async fn carts_cannot_be_reviewed() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;
    let client = common::auth_header(fixtures.client_id, UserRole::Client);

    // Open a cart but never submit it.
    let req = test::TestRequest::get()
        .uri("/api/carts")
        .insert_header(client.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let cart_id = body["data"]["order_id"].as_i64().expect("cart id");

    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .insert_header(client)
        .set_json(serde_json::json!({
            "order_id": cart_id,
            "rating": 5,
            "content": "Reviewing my own cart"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn reviews_are_client_written() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;
    let order_id = place_order(&app, &fixtures).await;

    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .insert_header(common::auth_header(fixtures.manager_id, UserRole::Manager))
        .set_json(serde_json::json!({
            "order_id": order_id,
            "rating": 5,
            "content": "Managers do not review"
        }))
        .to_request();
    let result = test::try_call_service(&app, req).await;
    let status = match result {
        Ok(r) => r.status(),
        Err(e) => e.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::FORBIDDEN);
}
