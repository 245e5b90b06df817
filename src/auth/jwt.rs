use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::config::AuthConfig;
use crate::auth::Principal;
use crate::models::user::UserRole;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("verification error: {0}")]
    Verify(String),
}

#[derive(Serialize, Deserialize)]
struct Claims {
    iss: String,
    aud: String,
    sub: String, // user_id
    role: String,
    iat: u64,
    exp: u64,
}

pub fn issue_token(user_id: i32, role: UserRole, cfg: &AuthConfig) -> Result<String, JwtError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let claims = Claims {
        iss: cfg.issuer.clone(),
        aud: cfg.audience.clone(),
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        iat: now,
        exp: now + cfg.expiry_secs,
    };
    let header = Header::new(Algorithm::HS256);
    encode(
        &header,
        &claims,
        &EncodingKey::from_secret(cfg.secret.as_bytes()),
    )
    .map_err(|e| JwtError::Verify(e.to_string()))
}

pub fn verify_token(token: &str, cfg: &AuthConfig) -> Result<Principal, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[cfg.issuer.as_str()]);
    validation.set_audience(&[cfg.audience.as_str()]);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(cfg.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| JwtError::Verify(e.to_string()))?;
    let user_id: i32 = data
        .claims
        .sub
        .parse()
        .map_err(|e| JwtError::Verify(format!("invalid sub: {e}")))?;
    let role = UserRole::parse(&data.claims.role)
        .ok_or_else(|| JwtError::Verify(format!("unknown role '{}'", data.claims.role)))?;
    Ok(Principal { user_id, role })
}
