use chrono::{Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::services::error::ServiceError;
use crate::types::UserId;

/// Bearer token claims. Tokens are issued elsewhere; this crate only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    /// Display name at issue time
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, name: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            name: name.into(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

/// Verify an HS256 token and return its claims. Expiry is enforced.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// Resolves the current request to a verified user id
pub trait IdentityContext: Send + Sync {
    /// Fails with `Unauthorized` when the request carries no verified identity
    fn current_user_id(&self) -> Result<UserId, ServiceError>;
}

/// Authenticated user extracted from a verified token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
}

impl AuthUser {
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
        }
    }
}

impl IdentityContext for AuthUser {
    fn current_user_id(&self) -> Result<UserId, ServiceError> {
        Ok(self.user_id)
    }
}

/// Identity attached to every request by the auth middleware; empty when no valid token was sent
#[derive(Clone, Debug, Default)]
pub struct RequestIdentity(pub Option<AuthUser>);

impl RequestIdentity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }
}

impl IdentityContext for RequestIdentity {
    fn current_user_id(&self) -> Result<UserId, ServiceError> {
        self.0
            .as_ref()
            .map(|user| user.user_id)
            .ok_or_else(|| ServiceError::unauthorized("Invalid or missing user identity"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn verifies_tokens_signed_with_the_secret() {
        let user_id = Uuid::new_v4();
        let token = sign(&Claims::new(user_id, "alice", Duration::hours(1)), "s3cret");

        let claims = verify_token(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(verify_token(&token, "other").is_err());
        assert!(matches!(verify_token(&token, ""), Err(AuthError::MissingSecret)));
    }

    #[test]
    fn rejects_expired_tokens() {
        let token = sign(&Claims::new(Uuid::new_v4(), "bob", Duration::hours(-2)), "s3cret");
        assert!(matches!(verify_token(&token, "s3cret"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn anonymous_identity_is_unauthorized() {
        let err = RequestIdentity::anonymous().current_user_id().unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }
}
