use actix_web::dev::Payload;
use actix_web::{error::ErrorUnauthorized, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};

use crate::auth::principal::Principal;
use crate::models::user::UserRole;

pub struct PrincipalExtractor(pub Principal);

impl FromRequest for PrincipalExtractor {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(p) = req.extensions().get::<Principal>() {
            return ready(Ok(PrincipalExtractor(*p)));
        }
        ready(Err(ErrorUnauthorized("missing principal")))
    }
}

fn require_role(req: &HttpRequest, allowed: &[UserRole]) -> Result<Principal, Error> {
    match req.extensions().get::<Principal>() {
        Some(p) if allowed.contains(&p.role) => Ok(*p),
        Some(_) => Err(actix_web::error::ErrorForbidden("role not allowed")),
        None => Err(ErrorUnauthorized("missing principal")),
    }
}

pub struct ClientPrincipal(pub Principal);

impl ClientPrincipal {
    pub fn user_id(&self) -> i32 {
        self.0.user_id
    }
}

impl FromRequest for ClientPrincipal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(require_role(req, &[UserRole::Client]).map(ClientPrincipal))
    }
}

/// Admin passes everywhere a manager does.
pub struct ManagerPrincipal(pub Principal);

impl ManagerPrincipal {
    pub fn user_id(&self) -> i32 {
        self.0.user_id
    }
}

impl FromRequest for ManagerPrincipal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(require_role(req, &[UserRole::Manager, UserRole::Admin]).map(ManagerPrincipal))
    }
}

pub struct CourierPrincipal(pub Principal);

impl CourierPrincipal {
    pub fn user_id(&self) -> i32 {
        self.0.user_id
    }
}

impl FromRequest for CourierPrincipal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(require_role(req, &[UserRole::Courier, UserRole::Admin]).map(CourierPrincipal))
    }
}

pub struct AdminPrincipal(pub Principal);

impl FromRequest for AdminPrincipal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(require_role(req, &[UserRole::Admin]).map(AdminPrincipal))
    }
}
