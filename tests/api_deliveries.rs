mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use pizzeria::models::user::UserRole;
use serde_json::Value;

/// Walks an order through the kitchen so it is sitting in the pickup queue.
async fn order_ready_for_pickup<S, B>(
    app: &S,
    fixtures: &pizzeria::test_utils::TestFixtures,
) -> i64
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let client = common::auth_header(fixtures.client_id, UserRole::Client);
    let req = test::TestRequest::post()
        .uri("/api/carts")
        .insert_header(client.clone())
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
        .insert_header(client)
        .set_json(serde_json::json!({
            "expected_price": "230",
            "address": "1 Test Street"
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let order_id = body["data"]["order_id"].as_i64().expect("order id");

    let manager = common::auth_header(fixtures.manager_id, UserRole::Manager);
    let req = test::TestRequest::post()
        .uri(&format!("/api/orders/confirm/{order_id}"))
        .insert_header(manager.clone())
        .to_request();
    test::call_service(app, req).await;
    let req = test::TestRequest::patch()
        .uri(&format!("/api/orders/{order_id}/transfer"))
        .insert_header(manager)
        .to_request();
    test::call_service(app, req).await;

    order_id
}

#[actix_rt::test]
async fn courier_takes_and_delivers_an_order() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;
    let order_id = order_ready_for_pickup(&app, &fixtures).await;
    let courier = common::auth_header(fixtures.courier_id, UserRole::Courier);

    // It shows up in the pickup queue.
    let req = test::TestRequest::get()
        .uri("/api/deliveries/available")
        .insert_header(courier.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"][0]["order_id"].as_i64(), Some(order_id));

    let req = test::TestRequest::put()
        .uri(&format!("/api/deliveries/take/{order_id}"))
        .insert_header(courier.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["data"]["courier_id"].as_i64(),
        Some(fixtures.courier_id as i64)
    );

    // Taken orders leave the queue.
    let req = test::TestRequest::get()
        .uri("/api/deliveries/available")
        .insert_header(courier.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let req = test::TestRequest::put()
        .uri(&format!("/api/deliveries/complete/{order_id}"))
        .insert_header(courier.clone())
        .set_json(serde_json::json!({
            "status": "is_delivered",
            "comment": null
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["successful"], true);

    // The closed delivery remains in the courier's history.
    let req = test::TestRequest::get()
        .uri("/api/deliveries")
        .insert_header(courier)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[actix_rt::test]
async fn second_courier_cannot_take_a_taken_order() {
    let (app, fixtures, db_url) = common::setup_api_app().await;
    let order_id = order_ready_for_pickup(&app, &fixtures).await;

    let pool = pizzeria::db::establish_connection_pool(&db_url);
    let mut conn = pizzeria::db::DbConnection::new(&pool).expect("db connection");
    let other_courier_id = pizzeria::test_utils::insert_user(
        conn.connection(),
        "courier2@example.com",
        "Courier Two",
        UserRole::Courier,
    )
    .expect("seed second courier");

    let req = test::TestRequest::put()
        .uri(&format!("/api/deliveries/take/{order_id}"))
        .insert_header(common::auth_header(fixtures.courier_id, UserRole::Courier))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri(&format!("/api/deliveries/take/{order_id}"))
        .insert_header(common::auth_header(other_courier_id, UserRole::Courier))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn delivery_endpoints_are_courier_only() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;

    let req = test::TestRequest::get()
        .uri("/api/deliveries/available")
        .insert_header(common::auth_header(fixtures.client_id, UserRole::Client))
        .to_request();
    let result = test::try_call_service(&app, req).await;
    let status = match result {
        Ok(r) => r.status(),
        Err(e) => e.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::FORBIDDEN);
}
