use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use utoipa_actix_web::{scope, service_config::ServiceConfig};

use crate::auth::{ManagerPrincipal, PrincipalExtractor};
use crate::db::PizzaOperations;
use crate::enums::catalog::{
    CatalogQuery, CreatePizzaRequest, PizzaResponse, PizzasResponse, SizesResponse,
    UpdatePizzaRequest,
};
use crate::models::catalog::{CatalogVisibility, NewPizzaSize};

use super::errors;

pub fn config(cfg: &mut ServiceConfig, pizza_ops: &PizzaOperations) {
    cfg.service(
        scope::scope("/pizzas")
            .app_data(web::Data::new(pizza_ops.clone()))
            .service(get_all_pizzas)
            .service(get_pizza)
            .service(create_pizza)
            .service(update_pizza)
            .service(remove_pizza)
            .service(restore_pizza),
    )
    .service(
        scope::scope("/pizzasizes")
            .app_data(web::Data::new(pizza_ops.clone()))
            .service(get_all_sizes)
            .service(create_size),
    );
}

#[utoipa::path(
    get,
    tag = "Pizzas",
    path = "",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Pizza catalog page", body = PizzasResponse)
    ),
    summary = "List pizzas with their default ingredients"
)]
#[get("")]
pub(super) async fn get_all_pizzas(
    pizza_ops: web::Data<PizzaOperations>,
    principal: PrincipalExtractor,
    query: web::Query<CatalogQuery>,
) -> impl Responder {
    let visibility = CatalogVisibility::for_role(principal.0.role, query.include_deleted);
    match pizza_ops.get_all_pizzas(visibility, query.last_id, query.limit()) {
        Ok(page) => HttpResponse::Ok().json(PizzasResponse {
            status: "ok".to_string(),
            data: page,
            error: None,
        }),
        Err(e) => {
            error!("PIZZAS: get_all_pizzas(): {}", e);
            errors::error_response(&e).json(PizzasResponse {
                status: "error".to_string(),
                data: vec![],
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    get,
    tag = "Pizzas",
    path = "/{id}",
    params(
        ("id", description = "Pizza id"),
    ),
    responses(
        (status = 200, description = "Pizza with default ingredients", body = PizzaResponse)
    ),
    summary = "Fetch one pizza"
)]
#[get("/{id}")]
pub(super) async fn get_pizza(
    pizza_ops: web::Data<PizzaOperations>,
    _principal: PrincipalExtractor,
    path: web::Path<(i32,)>,
) -> impl Responder {
    match pizza_ops.get_pizza(path.into_inner().0) {
        Ok(container) => HttpResponse::Ok().json(PizzaResponse {
            status: "ok".to_string(),
            data: Some(container),
            error: None,
        }),
        Err(e) => {
            error!("PIZZAS: get_pizza(): {}", e);
            errors::error_response(&e).json(PizzaResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    post,
    tag = "Pizzas",
    path = "",
    request_body = CreatePizzaRequest,
    responses(
        (status = 200, description = "Pizza created", body = PizzaResponse)
    ),
    summary = "Create a pizza with its default ingredient set"
)]
#[post("")]
pub(super) async fn create_pizza(
    pizza_ops: web::Data<PizzaOperations>,
    _principal: ManagerPrincipal,
    req_data: web::Json<CreatePizzaRequest>,
) -> impl Responder {
    let CreatePizzaRequest {
        pizza,
        ingredient_ids,
    } = req_data.into_inner();
    let pizza_name = pizza.name.clone();
    match pizza_ops.add_pizza(pizza, ingredient_ids) {
        Ok(container) => {
            info!("New pizza created: {}", pizza_name);
            HttpResponse::Ok().json(PizzaResponse {
                status: "ok".to_string(),
                data: Some(container),
                error: None,
            })
        }
        Err(e) => {
            error!("PIZZAS: create_pizza(): {}", e);
            errors::error_response(&e).json(PizzaResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    put,
    tag = "Pizzas",
    path = "/{id}",
    params(
        ("id", description = "Pizza id"),
    ),
    request_body = UpdatePizzaRequest,
    responses(
        (status = 200, description = "Pizza updated", body = PizzaResponse)
    ),
    summary = "Update a pizza and optionally replace its recipe"
)]
#[put("/{id}")]
pub(super) async fn update_pizza(
    pizza_ops: web::Data<PizzaOperations>,
    _principal: ManagerPrincipal,
    path: web::Path<(i32,)>,
    req_data: web::Json<UpdatePizzaRequest>,
) -> impl Responder {
    let pizza_id = path.into_inner().0;
    let UpdatePizzaRequest {
        pizza,
        ingredient_ids,
    } = req_data.into_inner();
    match pizza_ops.update_pizza(pizza_id, pizza, ingredient_ids) {
        Ok(container) => HttpResponse::Ok().json(PizzaResponse {
            status: "ok".to_string(),
            data: Some(container),
            error: None,
        }),
        Err(e) => {
            error!("PIZZAS: update_pizza(): {}", e);
            errors::error_response(&e).json(PizzaResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    delete,
    tag = "Pizzas",
    path = "/{id}",
    params(
        ("id", description = "Pizza id"),
    ),
    responses(
        (status = 200, description = "Pizza soft-deleted", body = PizzaResponse)
    ),
    summary = "Soft-delete a pizza"
)]
#[delete("/{id}")]
pub(super) async fn remove_pizza(
    pizza_ops: web::Data<PizzaOperations>,
    _principal: ManagerPrincipal,
    path: web::Path<(i32,)>,
) -> impl Responder {
    let pizza_id = path.into_inner().0;
    match pizza_ops.remove_pizza(pizza_id) {
        Ok(pizza) => {
            info!("Pizza removed: {}", pizza.name);
            HttpResponse::Ok().json(PizzaResponse {
                status: "ok".to_string(),
                data: None,
                error: None,
            })
        }
        Err(e) => {
            error!("PIZZAS: remove_pizza(): {}", e);
            errors::error_response(&e).json(PizzaResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    patch,
    tag = "Pizzas",
    path = "/{id}/restore",
    params(
        ("id", description = "Pizza id"),
    ),
    responses(
        (status = 200, description = "Pizza restored to active", body = PizzaResponse)
    ),
    summary = "Restore a soft-deleted pizza"
)]
#[patch("/{id}/restore")]
pub(super) async fn restore_pizza(
    pizza_ops: web::Data<PizzaOperations>,
    _principal: ManagerPrincipal,
    path: web::Path<(i32,)>,
) -> impl Responder {
    match pizza_ops.restore_pizza(path.into_inner().0) {
        Ok(pizza) => {
            info!("Pizza restored: {}", pizza.name);
            HttpResponse::Ok().json(PizzaResponse {
                status: "ok".to_string(),
                data: None,
                error: None,
            })
        }
        Err(e) => {
            error!("PIZZAS: restore_pizza(): {}", e);
            errors::error_response(&e).json(PizzaResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    get,
    tag = "Pizzas",
    path = "",
    responses(
        (status = 200, description = "All pizza sizes", body = SizesResponse)
    ),
    summary = "List pizza sizes"
)]
#[get("")]
pub(super) async fn get_all_sizes(
    pizza_ops: web::Data<PizzaOperations>,
    _principal: PrincipalExtractor,
) -> impl Responder {
    match pizza_ops.get_all_sizes() {
        Ok(sizes) => HttpResponse::Ok().json(SizesResponse {
            status: "ok".to_string(),
            data: sizes,
            error: None,
        }),
        Err(e) => {
            error!("PIZZAS: get_all_sizes(): {}", e);
            errors::error_response(&e).json(SizesResponse {
                status: "error".to_string(),
                data: vec![],
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    post,
    tag = "Pizzas",
    path = "",
    request_body = NewPizzaSize,
    responses(
        (status = 200, description = "Size created", body = SizesResponse)
    ),
    summary = "Create a pizza size"
)]
#[post("")]
pub(super) async fn create_size(
    pizza_ops: web::Data<PizzaOperations>,
    _principal: ManagerPrincipal,
    req_data: web::Json<NewPizzaSize>,
) -> impl Responder {
    match pizza_ops.add_size(req_data.into_inner()) {
        Ok(size) => {
            info!("New pizza size created: {}", size.name);
            HttpResponse::Ok().json(SizesResponse {
                status: "ok".to_string(),
                data: vec![size],
                error: None,
            })
        }
        Err(e) => {
            error!("PIZZAS: create_size(): {}", e);
            errors::error_response(&e).json(SizesResponse {
                status: "error".to_string(),
                data: vec![],
                error: Some(e.to_string()),
            })
        }
    }
}
