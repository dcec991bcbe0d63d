// JWT validation service
//
// Tokens are issued elsewhere; we only decode and validate them.

use crate::auth::error::AuthError;
use crate::auth::models::Role;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: Uuid,
    pub role: Role,
    /// Expiration timestamp (seconds since epoch)
    pub exp: i64,
    /// Issued-at timestamp
    pub iat: i64,
}

/// Token service for JWT validation
pub struct TokenService {
    secret: String,
}

impl TokenService {
    /// Create a new TokenService with the shared secret
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Validate an access token and return its claims
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::default();

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn issue(secret: &str, role: Role, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            role,
            iat: now,
            exp: now + exp_offset,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn validates_well_formed_token() {
        let service = TokenService::new("test-secret".to_string());
        let token = issue("test-secret", Role::Admin, 900);

        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn rejects_expired_token() {
        let service = TokenService::new("test-secret".to_string());
        let token = issue("test-secret", Role::User, -900);

        match service.validate_access_token(&token) {
            Err(AuthError::TokenExpired) => (),
            other => panic!("expected TokenExpired, got {:?}", other),
        }
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let service = TokenService::new("test-secret".to_string());
        let token = issue("another-secret", Role::User, 900);

        match service.validate_access_token(&token) {
            Err(AuthError::InvalidToken) => (),
            other => panic!("expected InvalidToken, got {:?}", other),
        }
    }
}
