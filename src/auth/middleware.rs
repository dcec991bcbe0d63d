// Authentication extractors for protected routes

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::auth::{error::AuthError, models::Actor, token::TokenService};

/// Authenticated user extractor for protected routes
///
/// Pulls the bearer token from the Authorization header, validates it and
/// exposes the actor (user id + role) to the handler.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        // Verify Bearer token format
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        // Get JWT secret from environment
        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| AuthError::ConfigError("JWT_SECRET not configured".to_string()))?;

        // Validate the token and build the actor
        let token_service = TokenService::new(jwt_secret);
        let claims = token_service.validate_access_token(token)?;

        debug!("Authenticated user {} with role {}", claims.sub, claims.role);
        Ok(AuthenticatedUser(Actor::new(claims.sub, claims.role)))
    }
}

/// Extractor that additionally requires the Admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(actor) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !actor.role.is_admin() {
            return Err(AuthError::InsufficientRole { required: "admin" });
        }

        Ok(AdminUser(actor))
    }
}
