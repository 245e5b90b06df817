use actix_web::{get, post, web, HttpResponse, Responder};
use utoipa_actix_web::{scope, service_config::ServiceConfig};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{jwt, AuthConfig, PrincipalExtractor};
use crate::db::UserOperations;
use crate::enums::account::{
    AccountInfo, AccountResponse, LoginRequest, RegisterRequest, SessionInfo, SessionResponse,
    TokenResponse,
};
use crate::models::user::{NewUser, UserRole};

use super::errors;

pub fn config(cfg: &mut ServiceConfig, user_ops: &UserOperations, auth_cfg: &AuthConfig) {
    cfg.service(
        scope::scope("/account")
            .app_data(web::Data::new(user_ops.clone()))
            .app_data(web::Data::new(auth_cfg.clone()))
            .service(register)
            .service(login)
            .service(logout)
            .service(validate)
            .service(get_account),
    );
}

#[utoipa::path(
    post,
    tag = "Account",
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created, token issued", body = TokenResponse)
    ),
    summary = "Register a new client account"
)]
#[post("/register")]
pub(super) async fn register(
    user_ops: web::Data<UserOperations>,
    auth_cfg: web::Data<AuthConfig>,
    req_data: web::Json<RegisterRequest>,
) -> impl Responder {
    let RegisterRequest {
        email,
        password,
        name,
    } = req_data.into_inner();

    if email.trim().is_empty() || password.is_empty() {
        return HttpResponse::BadRequest().json(TokenResponse {
            status: "error".to_string(),
            token: None,
            error: Some("Email and password must not be empty".to_string()),
        });
    }

    let password_hash = match hash_password(&password) {
        Ok(h) => h,
        Err(e) => {
            error!("ACCOUNT: register(): {}", e);
            return HttpResponse::InternalServerError().json(TokenResponse {
                status: "error".to_string(),
                token: None,
                error: Some("Registration failed".to_string()),
            });
        }
    };

    // Staff accounts are provisioned out of band; self-service registration
    // always creates a client.
    match user_ops.create_user(NewUser {
        email,
        password_hash,
        name,
        role: UserRole::Client,
    }) {
        Ok(user) => match jwt::issue_token(user.user_id, user.role, &auth_cfg) {
            Ok(token) => {
                info!("New account registered: {}", user.email);
                HttpResponse::Ok().json(TokenResponse {
                    status: "ok".to_string(),
                    token: Some(token),
                    error: None,
                })
            }
            Err(e) => {
                error!("ACCOUNT: register(): {}", e);
                HttpResponse::InternalServerError().json(TokenResponse {
                    status: "error".to_string(),
                    token: None,
                    error: Some("Registration failed".to_string()),
                })
            }
        },
        Err(e) => {
            error!("ACCOUNT: register(): {}", e);
            errors::error_response(&e).json(TokenResponse {
                status: "error".to_string(),
                token: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    post,
    tag = "Account",
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = TokenResponse)
    ),
    summary = "Exchange credentials for a bearer token"
)]
#[post("/login")]
pub(super) async fn login(
    user_ops: web::Data<UserOperations>,
    auth_cfg: web::Data<AuthConfig>,
    req_data: web::Json<LoginRequest>,
) -> impl Responder {
    let LoginRequest { email, password } = req_data.into_inner();

    // Lookup and verification failures collapse into one answer so the
    // endpoint cannot be used to probe for registered emails.
    let user = match user_ops.get_user_by_email(&email) {
        Ok(user) => user,
        Err(e) => {
            debug!("ACCOUNT: login(): lookup failed for {}: {}", email, e);
            return invalid_credentials();
        }
    };

    match verify_password(&password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(e) => {
            error!("ACCOUNT: login(): {}", e);
            return invalid_credentials();
        }
    }

    match jwt::issue_token(user.user_id, user.role, &auth_cfg) {
        Ok(token) => HttpResponse::Ok().json(TokenResponse {
            status: "ok".to_string(),
            token: Some(token),
            error: None,
        }),
        Err(e) => {
            error!("ACCOUNT: login(): {}", e);
            HttpResponse::InternalServerError().json(TokenResponse {
                status: "error".to_string(),
                token: None,
                error: Some("Login failed".to_string()),
            })
        }
    }
}

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(TokenResponse {
        status: "error".to_string(),
        token: None,
        error: Some("Invalid credentials".to_string()),
    })
}

#[utoipa::path(
    post,
    tag = "Account",
    path = "/logout",
    responses(
        (status = 200, description = "Logged out", body = TokenResponse)
    ),
    summary = "Log out (tokens are stateless; the client discards the token)"
)]
#[post("/logout")]
pub(super) async fn logout(_principal: PrincipalExtractor) -> impl Responder {
    HttpResponse::Ok().json(TokenResponse {
        status: "ok".to_string(),
        token: None,
        error: None,
    })
}

#[utoipa::path(
    get,
    tag = "Account",
    path = "/validate",
    responses(
        (status = 200, description = "Token is valid", body = SessionResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    summary = "Validate the bearer token"
)]
#[get("/validate")]
pub(super) async fn validate(principal: PrincipalExtractor) -> impl Responder {
    HttpResponse::Ok().json(SessionResponse {
        status: "ok".to_string(),
        data: Some(SessionInfo {
            user_id: principal.0.user_id,
            role: principal.0.role,
        }),
        error: None,
    })
}

#[utoipa::path(
    get,
    tag = "Account",
    path = "",
    responses(
        (status = 200, description = "Current account", body = AccountResponse)
    ),
    summary = "Fetch the authenticated account"
)]
#[get("")]
pub(super) async fn get_account(
    user_ops: web::Data<UserOperations>,
    principal: PrincipalExtractor,
) -> impl Responder {
    match user_ops.get_user_by_id(principal.0.user_id) {
        Ok(user) => HttpResponse::Ok().json(AccountResponse {
            status: "ok".to_string(),
            data: Some(AccountInfo {
                user_id: user.user_id,
                email: user.email,
                name: user.name,
                role: user.role,
            }),
            error: None,
        }),
        Err(e) => {
            error!("ACCOUNT: get_account(): {}", e);
            errors::error_response(&e).json(AccountResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}
