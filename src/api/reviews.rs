use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use utoipa_actix_web::{scope, service_config::ServiceConfig};

use crate::auth::{ClientPrincipal, PrincipalExtractor};
use crate::db::ReviewOperations;
use crate::enums::reviews::{
    CreateReviewRequest, ReviewQuery, ReviewResponse, ReviewsResponse, UpdateReviewRequest,
};

use super::errors;

pub fn config(cfg: &mut ServiceConfig, review_ops: &ReviewOperations) {
    cfg.service(
        scope::scope("/reviews")
            .app_data(web::Data::new(review_ops.clone()))
            .service(get_reviews)
            .service(create_review)
            .service(update_review)
            .service(delete_review),
    );
}

#[utoipa::path(
    get,
    tag = "Reviews",
    path = "",
    params(ReviewQuery),
    responses(
        (status = 200, description = "Review page", body = ReviewsResponse)
    ),
    summary = "List reviews, optionally for one order"
)]
#[get("")]
pub(super) async fn get_reviews(
    review_ops: web::Data<ReviewOperations>,
    _principal: PrincipalExtractor,
    query: web::Query<ReviewQuery>,
) -> impl Responder {
    match review_ops.get_reviews(query.order_id, query.last_id, query.limit()) {
        Ok(page) => HttpResponse::Ok().json(ReviewsResponse {
            status: "ok".to_string(),
            data: page,
            error: None,
        }),
        Err(e) => {
            error!("REVIEWS: get_reviews(): {}", e);
            errors::error_response(&e).json(ReviewsResponse {
                status: "error".to_string(),
                data: vec![],
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    post,
    tag = "Reviews",
    path = "",
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Rating out of range or order not placed", body = ReviewResponse)
    ),
    summary = "Review one of the client's placed orders"
)]
#[post("")]
pub(super) async fn create_review(
    review_ops: web::Data<ReviewOperations>,
    principal: ClientPrincipal,
    req_data: web::Json<CreateReviewRequest>,
) -> impl Responder {
    let CreateReviewRequest {
        order_id,
        rating,
        content,
    } = req_data.into_inner();
    match review_ops.create_review(principal.user_id(), order_id, rating, content) {
        Ok(review) => {
            debug!(
                "Review {} created for order {} by client {}",
                review.review_id,
                order_id,
                principal.user_id()
            );
            HttpResponse::Ok().json(ReviewResponse {
                status: "ok".to_string(),
                data: Some(review),
                error: None,
            })
        }
        Err(e) => {
            error!("REVIEWS: create_review(): {}", e);
            errors::error_response(&e).json(ReviewResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    put,
    tag = "Reviews",
    path = "/{id}",
    params(
        ("id", description = "Review id"),
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse)
    ),
    summary = "Update one of the client's own reviews"
)]
#[put("/{id}")]
pub(super) async fn update_review(
    review_ops: web::Data<ReviewOperations>,
    principal: ClientPrincipal,
    path: web::Path<(i32,)>,
    req_data: web::Json<UpdateReviewRequest>,
) -> impl Responder {
    let review_id = path.into_inner().0;
    let UpdateReviewRequest { rating, content } = req_data.into_inner();
    match review_ops.update_review(review_id, principal.user_id(), rating, content) {
        Ok(review) => HttpResponse::Ok().json(ReviewResponse {
            status: "ok".to_string(),
            data: Some(review),
            error: None,
        }),
        Err(e) => {
            error!("REVIEWS: update_review(): {}", e);
            errors::error_response(&e).json(ReviewResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    delete,
    tag = "Reviews",
    path = "/{id}",
    params(
        ("id", description = "Review id"),
    ),
    responses(
        (status = 200, description = "Review deleted", body = ReviewResponse)
    ),
    summary = "Delete one of the client's own reviews"
)]
#[delete("/{id}")]
pub(super) async fn delete_review(
    review_ops: web::Data<ReviewOperations>,
    principal: ClientPrincipal,
    path: web::Path<(i32,)>,
) -> impl Responder {
    let review_id = path.into_inner().0;
    match review_ops.delete_review(review_id, principal.user_id()) {
        Ok(()) => HttpResponse::Ok().json(ReviewResponse {
            status: "ok".to_string(),
            data: None,
            error: None,
        }),
        Err(e) => {
            error!("REVIEWS: delete_review(): {}", e);
            errors::error_response(&e).json(ReviewResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}
