use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use utoipa_actix_web::{scope, service_config::ServiceConfig};

use crate::auth::{ManagerPrincipal, PrincipalExtractor};
use crate::db::{OrderOperations, RepositoryError};
use crate::enums::orders::{OrderActionResponse, OrderResponse, OrdersResponse};
use crate::enums::PageQuery;
use crate::models::user::UserRole;

use super::errors;

pub fn config(cfg: &mut ServiceConfig, order_ops: &OrderOperations) {
    cfg.service(
        scope::scope("/orders")
            .app_data(web::Data::new(order_ops.clone()))
            .service(get_orders)
            .service(get_order)
            .service(confirm_order)
            .service(transfer_order)
            .service(cancel_order),
    );
}

#[utoipa::path(
    get,
    tag = "Orders",
    path = "",
    params(PageQuery),
    responses(
        (status = 200, description = "Orders visible to the caller", body = OrdersResponse)
    ),
    summary = "List orders scoped by role: clients see their own, managers all placed, couriers their deliveries"
)]
#[get("")]
pub(super) async fn get_orders(
    order_ops: web::Data<OrderOperations>,
    principal: PrincipalExtractor,
    query: web::Query<PageQuery>,
) -> impl Responder {
    let result = match principal.0.role {
        UserRole::Client => {
            order_ops.get_orders_by_client(principal.0.user_id, query.last_id, query.limit())
        }
        UserRole::Manager | UserRole::Admin => {
            order_ops.get_placed_orders(query.last_id, query.limit())
        }
        UserRole::Courier => {
            order_ops.get_orders_by_courier(principal.0.user_id, query.last_id, query.limit())
        }
    };
    match result {
        Ok(page) => HttpResponse::Ok().json(OrdersResponse {
            status: "ok".to_string(),
            data: page,
            error: None,
        }),
        Err(e) => {
            error!("ORDERS: get_orders(): {}", e);
            errors::error_response(&e).json(OrdersResponse {
                status: "error".to_string(),
                data: vec![],
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    get,
    tag = "Orders",
    path = "/{id}",
    params(
        ("id", description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order with its lines", body = OrderResponse)
    ),
    summary = "Fetch one order"
)]
#[get("/{id}")]
pub(super) async fn get_order(
    order_ops: web::Data<OrderOperations>,
    principal: PrincipalExtractor,
    path: web::Path<(i32,)>,
) -> impl Responder {
    let order_id = path.into_inner().0;
    let result = order_ops.get_order(order_id).and_then(|container| {
        // Clients only see their own orders; the mismatch reads as absent.
        if principal.0.role == UserRole::Client && container.order.client_id != principal.0.user_id
        {
            return Err(RepositoryError::NotFound(format!(
                "Order {order_id} not found"
            )));
        }
        Ok(container)
    });
    match result {
        Ok(container) => HttpResponse::Ok().json(OrderResponse {
            status: "ok".to_string(),
            data: Some(container),
            error: None,
        }),
        Err(e) => {
            error!("ORDERS: get_order(): {}", e);
            errors::error_response(&e).json(OrderResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    post,
    tag = "Orders",
    path = "/confirm/{id}",
    params(
        ("id", description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order accepted into preparation", body = OrderActionResponse),
        (status = 409, description = "Order is not awaiting acceptance", body = OrderActionResponse)
    ),
    summary = "Manager accepts a placed order"
)]
#[post("/confirm/{id}")]
pub(super) async fn confirm_order(
    order_ops: web::Data<OrderOperations>,
    principal: ManagerPrincipal,
    path: web::Path<(i32,)>,
) -> impl Responder {
    let order_id = path.into_inner().0;
    match order_ops.accept_order(order_id, principal.user_id()) {
        Ok(order) => {
            info!(
                "Order {} accepted by manager {}",
                order_id,
                principal.user_id()
            );
            HttpResponse::Ok().json(OrderActionResponse {
                status: "ok".to_string(),
                data: Some(order),
                error: None,
            })
        }
        Err(e) => {
            error!("ORDERS: confirm_order(): {}", e);
            errors::error_response(&e).json(OrderActionResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    patch,
    tag = "Orders",
    path = "/{id}/transfer",
    params(
        ("id", description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order handed to delivery", body = OrderActionResponse),
        (status = 409, description = "Order is not being prepared", body = OrderActionResponse)
    ),
    summary = "Manager marks a prepared order ready for courier pickup"
)]
#[patch("/{id}/transfer")]
pub(super) async fn transfer_order(
    order_ops: web::Data<OrderOperations>,
    _principal: ManagerPrincipal,
    path: web::Path<(i32,)>,
) -> impl Responder {
    let order_id = path.into_inner().0;
    match order_ops.transfer_to_delivery(order_id) {
        Ok(order) => {
            info!("Order {} transferred to delivery", order_id);
            HttpResponse::Ok().json(OrderActionResponse {
                status: "ok".to_string(),
                data: Some(order),
                error: None,
            })
        }
        Err(e) => {
            error!("ORDERS: transfer_order(): {}", e);
            errors::error_response(&e).json(OrderActionResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    delete,
    tag = "Orders",
    path = "/{id}",
    params(
        ("id", description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order cancelled", body = OrderActionResponse),
        (status = 409, description = "Order is past the point of cancellation", body = OrderActionResponse)
    ),
    summary = "Cancel an order; clients may only cancel their own"
)]
#[delete("/{id}")]
pub(super) async fn cancel_order(
    order_ops: web::Data<OrderOperations>,
    principal: PrincipalExtractor,
    path: web::Path<(i32,)>,
) -> impl Responder {
    let order_id = path.into_inner().0;
    let owner = match principal.0.role {
        UserRole::Client => Some(principal.0.user_id),
        UserRole::Manager | UserRole::Admin => None,
        UserRole::Courier => {
            return HttpResponse::Forbidden().json(OrderActionResponse {
                status: "error".to_string(),
                data: None,
                error: Some("Couriers cannot cancel orders".to_string()),
            })
        }
    };
    match order_ops.cancel_order(order_id, owner) {
        Ok(order) => {
            info!("Order {} cancelled", order_id);
            HttpResponse::Ok().json(OrderActionResponse {
                status: "ok".to_string(),
                data: Some(order),
                error: None,
            })
        }
        Err(e) => {
            error!("ORDERS: cancel_order(): {}", e);
            errors::error_response(&e).json(OrderActionResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}
