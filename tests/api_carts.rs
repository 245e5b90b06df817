mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use pizzeria::models::user::UserRole;
use serde_json::Value;

#[actix_rt::test]
async fn cart_flow_over_http() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;
    let auth = common::auth_header(fixtures.client_id, UserRole::Client);

    // First access creates an empty cart.
    let req = test::TestRequest::get()
        .uri("/api/carts")
        .insert_header(auth.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["lines"].as_array().map(Vec::len), Some(0));

    // Add a small Margherita.
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
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["price"], "230");
    let line_id = body["data"]["lines"][0]["line_id"]
        .as_i64()
        .expect("line id");

    // Bump the quantity.
    let req = test::TestRequest::put()
        .uri("/api/carts")
        .insert_header(auth.clone())
        .set_json(serde_json::json!({
            "line_id": line_id,
            "pizza_id": fixtures.pizza_id,
            "size_id": fixtures.size_small_id,
            "ingredient_ids": [],
            "quantity": 2
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["price"], "460");

    // Submit at the quoted price.
    let req = test::TestRequest::post()
        .uri("/api/carts/submit")
        .insert_header(auth.clone())
        .set_json(serde_json::json!({
            "expected_price": "460",
            "address": "1 Test Street"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["status"], "is_being_formed");
    assert_eq!(body["data"]["address"], "1 Test Street");
}

#[actix_rt::test]
async fn remove_line_over_http() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;
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
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let line_id = body["data"]["lines"][0]["line_id"]
        .as_i64()
        .expect("line id");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/carts/{line_id}"))
        .insert_header(auth)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["lines"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["data"]["price"], "0");
}

#[actix_rt::test]
async fn stale_submit_returns_conflict_with_the_current_cart() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;
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
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/carts/submit")
        .insert_header(auth)
        .set_json(serde_json::json!({
            "expected_price": "999",
            "address": "1 Test Street"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
    // The response carries the live cart for re-rendering.
    assert_eq!(body["cart"]["price"], "230");
}

#[actix_rt::test]
async fn empty_cart_submit_is_a_bad_request_not_a_price_conflict() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;
    let auth = common::auth_header(fixtures.client_id, UserRole::Client);

    // Open the cart without putting anything in it.
    let req = test::TestRequest::get()
        .uri("/api/carts")
        .insert_header(auth.clone())
        .to_request();
    test::call_service(&app, req).await;

    // The positive expected price also disagrees with the cart's stored
    // zero, but emptiness must be what the client hears about.
    let req = test::TestRequest::post()
        .uri("/api/carts/submit")
        .insert_header(auth)
        .set_json(serde_json::json!({
            "expected_price": "230",
            "address": "1 Test Street"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["cart"]["lines"].as_array().map(Vec::len), Some(0));
}

#[actix_rt::test]
async fn staff_have_no_cart() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;

    let req = test::TestRequest::get()
        .uri("/api/carts")
        .insert_header(common::auth_header(fixtures.manager_id, UserRole::Manager))
        .to_request();
    let result = test::try_call_service(&app, req).await;
    let status = match result {
        Ok(r) => r.status(),
        Err(e) => e.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::FORBIDDEN);
}
