//! Authentication and authorization
//!
//! Tokens are HS256 JWTs whose subject is the user id. The role carried in
//! the token is informational: every request re-loads the account, so the
//! stored role and active flag are what [`CurrentUser`] reflects.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use core_kernel::UserId;
use domain_access::permissions::{self, Action, Actor};
use domain_access::{Role, User, UserView};

use crate::error::ApiError;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub role: Role,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        Uuid::parse_str(&self.sub)
            .map(UserId::from)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token could not be signed: {0}")]
    Signing(String),
}

/// Creates a signed token for a user
pub fn create_token(user: &User, secret: &str, expiration_secs: u64) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs.min(i32::MAX as u64) as i64);

    let claims = Claims {
        sub: user.id.as_uuid().to_string(),
        username: user.username.clone(),
        role: user.role,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Validates signature and expiry of a token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Extracts the token from an `Authorization: Bearer ...` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// The authenticated account, inserted by the auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserView);

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.0.id, self.0.role)
    }

    /// Fails with 403 unless the role may perform `action`
    pub fn require(&self, action: Action) -> Result<(), ApiError> {
        permissions::require(self.role(), action).map_err(ApiError::from)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User::new(UserId::new(), "taquilla", "t@example.com", "hash", role, Utc::now())
    }

    #[test]
    fn test_token_round_trip() {
        let user = user(Role::Register);
        let token = create_token(&user, "secret", 60).unwrap();
        let claims = validate_token(&token, "secret").unwrap();

        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.role, Role::Register);
        assert_eq!(claims.username, "taquilla");
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = create_token(&user(Role::Admin), "secret", 60).unwrap();
        assert!(matches!(
            validate_token(&token, "other"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::now_v7().to_string(),
            username: "old".into(),
            role: Role::Admin,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(matches!(
            validate_token(&token, "secret"),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(bearer_token(Some("Basic abc")).is_err());
        assert!(bearer_token(Some("Bearer ")).is_err());
        assert!(bearer_token(None).is_err());
    }
}
