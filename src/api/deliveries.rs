use actix_web::{get, put, web, HttpResponse, Responder};
use utoipa_actix_web::{scope, service_config::ServiceConfig};

use crate::auth::CourierPrincipal;
use crate::db::DeliveryOperations;
use crate::enums::deliveries::{
    AvailableOrdersResponse, CompleteDeliveryRequest, DeliveriesResponse, DeliveryResponse,
};
use crate::enums::PageQuery;

use super::errors;

pub fn config(cfg: &mut ServiceConfig, delivery_ops: &DeliveryOperations) {
    cfg.service(
        scope::scope("/deliveries")
            .app_data(web::Data::new(delivery_ops.clone()))
            .service(get_deliveries)
            .service(get_available_orders)
            .service(take_order)
            .service(complete_delivery),
    );
}

#[utoipa::path(
    get,
    tag = "Deliveries",
    path = "",
    params(PageQuery),
    responses(
        (status = 200, description = "Courier's deliveries", body = DeliveriesResponse)
    ),
    summary = "List the courier's own deliveries"
)]
#[get("")]
pub(super) async fn get_deliveries(
    delivery_ops: web::Data<DeliveryOperations>,
    principal: CourierPrincipal,
    query: web::Query<PageQuery>,
) -> impl Responder {
    match delivery_ops.get_deliveries_by_courier(principal.user_id(), query.last_id, query.limit())
    {
        Ok(page) => HttpResponse::Ok().json(DeliveriesResponse {
            status: "ok".to_string(),
            data: page,
            error: None,
        }),
        Err(e) => {
            error!("DELIVERIES: get_deliveries(): {}", e);
            errors::error_response(&e).json(DeliveriesResponse {
                status: "error".to_string(),
                data: vec![],
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    get,
    tag = "Deliveries",
    path = "/available",
    params(PageQuery),
    responses(
        (status = 200, description = "Orders waiting for a courier", body = AvailableOrdersResponse)
    ),
    summary = "List orders ready for pickup"
)]
#[get("/available")]
pub(super) async fn get_available_orders(
    delivery_ops: web::Data<DeliveryOperations>,
    _principal: CourierPrincipal,
    query: web::Query<PageQuery>,
) -> impl Responder {
    match delivery_ops.get_available_orders(query.last_id, query.limit()) {
        Ok(page) => HttpResponse::Ok().json(AvailableOrdersResponse {
            status: "ok".to_string(),
            data: page,
            error: None,
        }),
        Err(e) => {
            error!("DELIVERIES: get_available_orders(): {}", e);
            errors::error_response(&e).json(AvailableOrdersResponse {
                status: "error".to_string(),
                data: vec![],
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    put,
    tag = "Deliveries",
    path = "/take/{order_id}",
    params(
        ("order_id", description = "Order to pick up"),
    ),
    responses(
        (status = 200, description = "Delivery created", body = DeliveryResponse),
        (status = 409, description = "Order is not ready or already taken", body = DeliveryResponse)
    ),
    summary = "Courier claims an order for delivery"
)]
#[put("/take/{order_id}")]
pub(super) async fn take_order(
    delivery_ops: web::Data<DeliveryOperations>,
    principal: CourierPrincipal,
    path: web::Path<(i32,)>,
) -> impl Responder {
    let order_id = path.into_inner().0;
    match delivery_ops.take_order(order_id, principal.user_id()) {
        Ok(delivery) => {
            info!(
                "Order {} taken by courier {}",
                order_id,
                principal.user_id()
            );
            HttpResponse::Ok().json(DeliveryResponse {
                status: "ok".to_string(),
                data: Some(delivery),
                error: None,
            })
        }
        Err(e) => {
            error!("DELIVERIES: take_order(): {}", e);
            errors::error_response(&e).json(DeliveryResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    put,
    tag = "Deliveries",
    path = "/complete/{order_id}",
    params(
        ("order_id", description = "Order whose delivery is being closed"),
    ),
    request_body = CompleteDeliveryRequest,
    responses(
        (status = 200, description = "Delivery completed", body = DeliveryResponse),
        (status = 409, description = "Delivery already completed", body = DeliveryResponse)
    ),
    summary = "Courier records the delivery outcome"
)]
#[put("/complete/{order_id}")]
pub(super) async fn complete_delivery(
    delivery_ops: web::Data<DeliveryOperations>,
    _principal: CourierPrincipal,
    path: web::Path<(i32,)>,
    req_data: web::Json<CompleteDeliveryRequest>,
) -> impl Responder {
    let order_id = path.into_inner().0;
    let CompleteDeliveryRequest { status, comment } = req_data.into_inner();
    match delivery_ops.complete_delivery(order_id, &status, comment.as_deref()) {
        Ok(delivery) => {
            info!("Delivery for order {} completed as '{}'", order_id, status);
            HttpResponse::Ok().json(DeliveryResponse {
                status: "ok".to_string(),
                data: Some(delivery),
                error: None,
            })
        }
        Err(e) => {
            error!("DELIVERIES: complete_delivery(): {}", e);
            errors::error_response(&e).json(DeliveryResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}
