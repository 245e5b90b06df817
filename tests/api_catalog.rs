mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use pizzeria::models::user::UserRole;
use serde_json::Value;

#[actix_rt::test]
async fn manager_builds_the_catalog() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;
    let manager = common::auth_header(fixtures.manager_id, UserRole::Manager);

    // New ingredient.
    let req = test::TestRequest::post()
        .uri("/api/ingredients")
        .insert_header(manager.clone())
        .set_json(serde_json::json!({
            "name": "Olives",
            "description": "Pitted",
            "price_per_gram": "1",
            "weight_small": 5,
            "weight_medium": 8,
            "weight_big": 12,
            "state": "active"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let olives_id = body["data"]["ingredient_id"].as_i64().expect("id");

    // New pizza built from it.
    let req = test::TestRequest::post()
        .uri("/api/pizzas")
        .insert_header(manager.clone())
        .set_json(serde_json::json!({
            "pizza": {
                "name": "Greca",
                "description": null,
                "image_link": null,
                "state": "active"
            },
            "ingredient_ids": [fixtures.cheese_id, olives_id]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["pizza"]["name"], "Greca");
    assert_eq!(
        body["data"]["ingredients"].as_array().map(Vec::len),
        Some(2)
    );

    // New size.
    let req = test::TestRequest::post()
        .uri("/api/pizzasizes")
        .insert_header(manager)
        .set_json(serde_json::json!({
            "name": "Big",
            "base_price": "400",
            "base_weight": 800
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Any authenticated user can browse all of it.
    let client = common::auth_header(fixtures.client_id, UserRole::Client);
    let req = test::TestRequest::get()
        .uri("/api/pizzas")
        .insert_header(client.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

    let req = test::TestRequest::get()
        .uri("/api/pizzasizes")
        .insert_header(client)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));
}

#[actix_rt::test]
async fn pizza_with_unknown_ingredients_is_rejected() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;

    let req = test::TestRequest::post()
        .uri("/api/pizzas")
        .insert_header(common::auth_header(fixtures.manager_id, UserRole::Manager))
        .set_json(serde_json::json!({
            "pizza": {
                "name": "Phantom",
                "description": null,
                "image_link": null,
                "state": "active"
            },
            "ingredient_ids": [99999]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn deleted_pizzas_are_hidden_unless_asked_for() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;
    let manager = common::auth_header(fixtures.manager_id, UserRole::Manager);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/pizzas/{}", fixtures.pizza_id))
        .insert_header(manager.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/pizzas")
        .insert_header(manager.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let req = test::TestRequest::get()
        .uri("/api/pizzas?include_deleted=true")
        .insert_header(manager.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["pizza"]["state"], "deleted");

    // And restored on request.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/pizzas/{}/restore", fixtures.pizza_id))
        .insert_header(manager.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/pizzas")
        .insert_header(manager)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"][0]["pizza"]["state"], "active");
}

#[actix_rt::test]
async fn clients_see_only_the_active_catalog() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;
    let manager = common::auth_header(fixtures.manager_id, UserRole::Manager);
    let client = common::auth_header(fixtures.client_id, UserRole::Client);

    // Retire the pizza and take pepperoni off sale.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/pizzas/{}", fixtures.pizza_id))
        .insert_header(manager.clone())
        .to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::put()
        .uri(&format!("/api/ingredients/{}", fixtures.pepperoni_id))
        .insert_header(manager.clone())
        .set_json(serde_json::json!({ "state": "unavailable" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The flag buys a client nothing: deleted stays hidden.
    let req = test::TestRequest::get()
        .uri("/api/pizzas?include_deleted=true")
        .insert_header(client.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    // Unavailable items are hidden from clients too.
    let req = test::TestRequest::get()
        .uri("/api/ingredients")
        .insert_header(client)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["name"], "Mozzarella");

    // The manager still sees unavailable stock in the default listing.
    let req = test::TestRequest::get()
        .uri("/api/ingredients")
        .insert_header(manager)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
}

#[actix_rt::test]
async fn ingredient_updates_are_manager_only() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/ingredients/{}", fixtures.cheese_id))
        .insert_header(common::auth_header(fixtures.client_id, UserRole::Client))
        .set_json(serde_json::json!({ "price_per_gram": "9" }))
        .to_request();
    let result = test::try_call_service(&app, req).await;
    let status = match result {
        Ok(r) => r.status(),
        Err(e) => e.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins pass the same gate managers do.
    let req = test::TestRequest::put()
        .uri(&format!("/api/ingredients/{}", fixtures.cheese_id))
        .insert_header(common::auth_header(fixtures.manager_id, UserRole::Admin))
        .set_json(serde_json::json!({ "price_per_gram": "9" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["price_per_gram"], "9");
}

#[actix_rt::test]
async fn ingredient_deletion_is_admin_only() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;

    // Managers edit the catalog but cannot retire ingredients.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/ingredients/{}", fixtures.pepperoni_id))
        .insert_header(common::auth_header(fixtures.manager_id, UserRole::Manager))
        .to_request();
    let result = test::try_call_service(&app, req).await;
    let status = match result {
        Ok(r) => r.status(),
        Err(e) => e.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/ingredients/{}", fixtures.pepperoni_id))
        .insert_header(common::auth_header(fixtures.manager_id, UserRole::Admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/ingredients")
        .insert_header(common::auth_header(fixtures.client_id, UserRole::Client))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}
