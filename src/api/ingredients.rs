use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use utoipa_actix_web::{scope, service_config::ServiceConfig};

use crate::auth::{AdminPrincipal, ManagerPrincipal, PrincipalExtractor};
use crate::db::IngredientOperations;
use crate::enums::catalog::{CatalogQuery, IngredientResponse, IngredientsResponse};
use crate::models::catalog::{CatalogVisibility, NewIngredient, UpdateIngredient};

use super::errors;

pub fn config(cfg: &mut ServiceConfig, ingredient_ops: &IngredientOperations) {
    cfg.service(
        scope::scope("/ingredients")
            .app_data(web::Data::new(ingredient_ops.clone()))
            .service(get_all_ingredients)
            .service(get_ingredient)
            .service(create_ingredient)
            .service(update_ingredient)
            .service(remove_ingredient),
    );
}

#[utoipa::path(
    get,
    tag = "Ingredients",
    path = "",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Ingredient catalog page", body = IngredientsResponse)
    ),
    summary = "List ingredients"
)]
#[get("")]
pub(super) async fn get_all_ingredients(
    ingredient_ops: web::Data<IngredientOperations>,
    principal: PrincipalExtractor,
    query: web::Query<CatalogQuery>,
) -> impl Responder {
    let visibility = CatalogVisibility::for_role(principal.0.role, query.include_deleted);
    match ingredient_ops.get_all_ingredients(visibility, query.last_id, query.limit()) {
        Ok(page) => HttpResponse::Ok().json(IngredientsResponse {
            status: "ok".to_string(),
            data: page,
            error: None,
        }),
        Err(e) => {
            error!("INGREDIENTS: get_all_ingredients(): {}", e);
            errors::error_response(&e).json(IngredientsResponse {
                status: "error".to_string(),
                data: vec![],
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    get,
    tag = "Ingredients",
    path = "/{id}",
    params(
        ("id", description = "Ingredient id"),
    ),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse)
    ),
    summary = "Fetch one ingredient"
)]
#[get("/{id}")]
pub(super) async fn get_ingredient(
    ingredient_ops: web::Data<IngredientOperations>,
    _principal: PrincipalExtractor,
    path: web::Path<(i32,)>,
) -> impl Responder {
    match ingredient_ops.get_ingredient(path.into_inner().0) {
        Ok(ingredient) => HttpResponse::Ok().json(IngredientResponse {
            status: "ok".to_string(),
            data: Some(ingredient),
            error: None,
        }),
        Err(e) => {
            error!("INGREDIENTS: get_ingredient(): {}", e);
            errors::error_response(&e).json(IngredientResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    post,
    tag = "Ingredients",
    path = "",
    request_body = NewIngredient,
    responses(
        (status = 200, description = "Ingredient created", body = IngredientResponse)
    ),
    summary = "Create an ingredient"
)]
#[post("")]
pub(super) async fn create_ingredient(
    ingredient_ops: web::Data<IngredientOperations>,
    _principal: ManagerPrincipal,
    req_data: web::Json<NewIngredient>,
) -> impl Responder {
    let req_data = req_data.into_inner();
    let ingredient_name = req_data.name.clone();
    match ingredient_ops.add_ingredient(req_data) {
        Ok(ingredient) => {
            info!("New ingredient created: {}", ingredient_name);
            HttpResponse::Ok().json(IngredientResponse {
                status: "ok".to_string(),
                data: Some(ingredient),
                error: None,
            })
        }
        Err(e) => {
            error!("INGREDIENTS: create_ingredient(): {}", e);
            errors::error_response(&e).json(IngredientResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    put,
    tag = "Ingredients",
    path = "/{id}",
    params(
        ("id", description = "Ingredient id"),
    ),
    request_body = UpdateIngredient,
    responses(
        (status = 200, description = "Ingredient updated; open carts re-priced", body = IngredientResponse)
    ),
    summary = "Update an ingredient"
)]
#[put("/{id}")]
pub(super) async fn update_ingredient(
    ingredient_ops: web::Data<IngredientOperations>,
    _principal: ManagerPrincipal,
    path: web::Path<(i32,)>,
    req_data: web::Json<UpdateIngredient>,
) -> impl Responder {
    let ingredient_id = path.into_inner().0;
    let changes = req_data.into_inner();
    match ingredient_ops.update_ingredient(ingredient_id, changes.clone()) {
        Ok(ingredient) => {
            info!(
                "Ingredient updated: {}.\nChanges: {:?}",
                ingredient.name, changes
            );
            HttpResponse::Ok().json(IngredientResponse {
                status: "ok".to_string(),
                data: Some(ingredient),
                error: None,
            })
        }
        Err(e) => {
            error!("INGREDIENTS: update_ingredient(): {}", e);
            errors::error_response(&e).json(IngredientResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    delete,
    tag = "Ingredients",
    path = "/{id}",
    params(
        ("id", description = "Ingredient id"),
    ),
    responses(
        (status = 200, description = "Ingredient soft-deleted", body = IngredientResponse)
    ),
    summary = "Soft-delete an ingredient (admin only)"
)]
#[delete("/{id}")]
pub(super) async fn remove_ingredient(
    ingredient_ops: web::Data<IngredientOperations>,
    _principal: AdminPrincipal,
    path: web::Path<(i32,)>,
) -> impl Responder {
    match ingredient_ops.remove_ingredient(path.into_inner().0) {
        Ok(ingredient) => {
            info!("Ingredient removed: {}", ingredient.name);
            HttpResponse::Ok().json(IngredientResponse {
                status: "ok".to_string(),
                data: None,
                error: None,
            })
        }
        Err(e) => {
            error!("INGREDIENTS: remove_ingredient(): {}", e);
            errors::error_response(&e).json(IngredientResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}
