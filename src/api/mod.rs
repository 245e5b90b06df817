pub mod account;
pub mod carts;
pub mod deliveries;
mod errors;
pub mod ingredients;
pub mod orders;
pub mod pizzas;
pub mod reviews;

use actix_web::{get, HttpResponse, Responder};
pub use errors::default_error_handler;
use utoipa_actix_web::{scope, service_config::ServiceConfig};

use crate::AppState;

#[utoipa::path(
    get,
    tag = "Health",
    path = "/",
    responses(
        (status = 200, description = "Server is up")
    ),
    summary = "Liveness probe"
)]
#[get("/")]
async fn root_endpoint() -> impl Responder {
    HttpResponse::Ok().body("Server up!")
}

#[utoipa::path(
    get,
    tag = "Health",
    path = "/health",
    responses(
        (status = 200, description = "Server is up")
    ),
    summary = "Health check"
)]
#[get("/health")]
async fn health_endpoint() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

pub fn configure(cfg: &mut ServiceConfig, state: &AppState) {
    cfg.service(root_endpoint)
        .service(health_endpoint)
        .service(
            scope::scope("/api")
                .configure(|cfg| account::config(cfg, &state.user_ops, &state.auth_cfg))
                .configure(|cfg| carts::config(cfg, &state.cart_ops))
                .configure(|cfg| pizzas::config(cfg, &state.pizza_ops))
                .configure(|cfg| ingredients::config(cfg, &state.ingredient_ops))
                .configure(|cfg| orders::config(cfg, &state.order_ops))
                .configure(|cfg| deliveries::config(cfg, &state.delivery_ops))
                .configure(|cfg| reviews::config(cfg, &state.review_ops)),
        );
}
