use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use utoipa_actix_web::{scope, service_config::ServiceConfig};

use crate::auth::ClientPrincipal;
use crate::db::{CartOperations, RepositoryError};
use crate::enums::carts::{
    AddCartItemRequest, CartResponse, SubmitCartRequest, SubmitCartResponse, UpdateCartRequest,
};

use super::errors;

pub fn config(cfg: &mut ServiceConfig, cart_ops: &CartOperations) {
    cfg.service(
        scope::scope("/carts")
            .app_data(web::Data::new(cart_ops.clone()))
            .service(get_cart)
            .service(add_item)
            .service(update_item)
            .service(remove_item)
            .service(submit_cart),
    );
}

#[utoipa::path(
    get,
    tag = "Carts",
    path = "",
    responses(
        (status = 200, description = "Current cart", body = CartResponse)
    ),
    summary = "Fetch the client's cart, creating an empty one on first use"
)]
#[get("")]
pub(super) async fn get_cart(
    cart_ops: web::Data<CartOperations>,
    principal: ClientPrincipal,
) -> impl Responder {
    match cart_ops.get_or_create_cart(principal.user_id()) {
        Ok(view) => HttpResponse::Ok().json(CartResponse {
            status: "ok".to_string(),
            data: Some(view),
            error: None,
        }),
        Err(e) => {
            error!("CARTS: get_cart(): {}", e);
            errors::error_response(&e).json(CartResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    post,
    tag = "Carts",
    path = "",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Item added, updated cart returned", body = CartResponse)
    ),
    summary = "Add a pizza to the cart"
)]
#[post("")]
pub(super) async fn add_item(
    cart_ops: web::Data<CartOperations>,
    principal: ClientPrincipal,
    req_data: web::Json<AddCartItemRequest>,
) -> impl Responder {
    let req_data = req_data.into_inner();
    match cart_ops.add_item(
        principal.user_id(),
        req_data.pizza_id,
        req_data.size_id,
        &req_data.ingredient_ids,
        req_data.quantity,
    ) {
        Ok(view) => {
            debug!(
                "Cart item added for client {}: pizza {} x{}",
                principal.user_id(),
                req_data.pizza_id,
                req_data.quantity
            );
            HttpResponse::Ok().json(CartResponse {
                status: "ok".to_string(),
                data: Some(view),
                error: None,
            })
        }
        Err(e) => {
            error!("CARTS: add_item(): {}", e);
            errors::error_response(&e).json(CartResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    put,
    tag = "Carts",
    path = "",
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Line replaced, updated cart returned", body = CartResponse)
    ),
    summary = "Replace one cart line"
)]
#[put("")]
pub(super) async fn update_item(
    cart_ops: web::Data<CartOperations>,
    principal: ClientPrincipal,
    req_data: web::Json<UpdateCartRequest>,
) -> impl Responder {
    let req_data = req_data.into_inner();
    match cart_ops.update_item(
        principal.user_id(),
        req_data.line_id,
        req_data.pizza_id,
        req_data.size_id,
        &req_data.ingredient_ids,
        req_data.quantity,
    ) {
        Ok(view) => HttpResponse::Ok().json(CartResponse {
            status: "ok".to_string(),
            data: Some(view),
            error: None,
        }),
        Err(e) => {
            error!("CARTS: update_item(): {}", e);
            errors::error_response(&e).json(CartResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    delete,
    tag = "Carts",
    path = "/{line_id}",
    params(
        ("line_id", description = "Cart line to remove"),
    ),
    responses(
        (status = 200, description = "Line removed, updated cart returned", body = CartResponse)
    ),
    summary = "Remove one line from the cart"
)]
#[delete("/{line_id}")]
pub(super) async fn remove_item(
    cart_ops: web::Data<CartOperations>,
    principal: ClientPrincipal,
    path: web::Path<(i32,)>,
) -> impl Responder {
    let line_id = path.into_inner().0;
    match cart_ops.remove_item(principal.user_id(), line_id) {
        Ok(view) => HttpResponse::Ok().json(CartResponse {
            status: "ok".to_string(),
            data: Some(view),
            error: None,
        }),
        Err(e) => {
            error!("CARTS: remove_item(): {}", e);
            errors::error_response(&e).json(CartResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    post,
    tag = "Carts",
    path = "/submit",
    request_body = SubmitCartRequest,
    responses(
        (status = 200, description = "Order placed", body = SubmitCartResponse),
        (status = 409, description = "Cart price no longer matches", body = SubmitCartResponse)
    ),
    summary = "Submit the cart as an order"
)]
#[post("/submit")]
pub(super) async fn submit_cart(
    cart_ops: web::Data<CartOperations>,
    principal: ClientPrincipal,
    req_data: web::Json<SubmitCartRequest>,
) -> impl Responder {
    let SubmitCartRequest {
        expected_price,
        address,
    } = req_data.into_inner();

    match cart_ops.submit(principal.user_id(), &expected_price, &address) {
        Ok(order) => {
            info!(
                "Order {} placed by client {}",
                order.order_id,
                principal.user_id()
            );
            HttpResponse::Ok().json(SubmitCartResponse {
                status: "ok".to_string(),
                data: Some(order),
                cart: None,
                error: None,
            })
        }
        Err(e) => {
            error!("CARTS: submit_cart(): {}", e);
            // A stale or empty cart failure carries the current server-side
            // cart so the client can re-render before retrying.
            let cart = match &e {
                RepositoryError::OutdatedCart { .. } | RepositoryError::EmptyCart(_) => {
                    cart_ops.get_or_create_cart(principal.user_id()).ok()
                }
                _ => None,
            };
            errors::error_response(&e).json(SubmitCartResponse {
                status: "error".to_string(),
                data: None,
                cart,
                error: Some(e.to_string()),
            })
        }
    }
}
