use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::user::UserRole;

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    pub status: String,
    pub token: Option<String>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AccountResponse {
    pub status: String,
    pub data: Option<AccountInfo>,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AccountInfo {
    pub user_id: i32,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub status: String,
    pub data: Option<SessionInfo>,
    pub error: Option<String>,
}

/// What the bearer token says about its holder, without touching the database.
#[derive(Serialize, ToSchema)]
pub struct SessionInfo {
    pub user_id: i32,
    pub role: UserRole,
}
