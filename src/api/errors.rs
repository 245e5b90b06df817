use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{Error, HttpRequest, HttpResponse, HttpResponseBuilder};

use crate::db::RepositoryError;

pub fn default_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    error!("Error in request: {} \n Error: {}", req.full_url(), err);
    actix_web::error::InternalError::from_response("", HttpResponse::BadRequest().finish()).into()
}

pub(crate) fn status_for(e: &RepositoryError) -> StatusCode {
    match e {
        RepositoryError::ValidationError(_) | RepositoryError::EmptyCart(_) => {
            StatusCode::BAD_REQUEST
        }
        RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
        RepositoryError::InvalidState(_) | RepositoryError::OutdatedCart { .. } => {
            StatusCode::CONFLICT
        }
        RepositoryError::DatabaseError(_) | RepositoryError::ConnectionPoolError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn error_response(e: &RepositoryError) -> HttpResponseBuilder {
    HttpResponse::build(status_for(e))
}
