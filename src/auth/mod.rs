use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Role;

pub mod password;

/// Claims embedded in a session token. Validation decodes these verbatim;
/// no database lookup happens, so a role change or account deletion is not
/// visible until the token expires (24h by default).
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i32, username: String, role: Role, expiry_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            username,
            role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours)).timestamp(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("token generation failed")]
    Generation,
}

/// Sign the claims with the server secret (HS256).
pub fn issue_token(secret: &str, claims: &Claims) -> Result<String, TokenError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| TokenError::Generation)
}

/// Decode and verify a token. Structural failures (including an unknown
/// role string) map to `Malformed`, signature mismatch to `BadSignature`,
/// and an `exp` in the past to `Expired`.
pub fn validate_token(secret: &str, token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        _ => TokenError::Malformed,
    })
}
