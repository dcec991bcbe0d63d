// Authentication and authorization errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::fmt;
use tracing::warn;

/// Errors raised while extracting and checking the authenticated actor
#[derive(Debug)]
pub enum AuthError {
    /// No Authorization header on a protected route
    MissingToken,

    /// Malformed or badly signed token
    InvalidToken,

    /// Token is past its expiry
    TokenExpired,

    /// Actor lacks the required role
    InsufficientRole { required: &'static str },

    /// Auth subsystem misconfiguration (e.g. missing secret)
    ConfigError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::InvalidToken => write!(f, "Invalid authentication token"),
            AuthError::TokenExpired => write!(f, "Authentication token expired"),
            AuthError::InsufficientRole { required } => {
                write!(f, "Insufficient permissions: required role '{}'", required)
            }
            AuthError::ConfigError(msg) => write!(f, "Auth configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::InsufficientRole { .. } => {
                warn!("Authorization failure: {}", self);
                (StatusCode::FORBIDDEN, self.to_string())
            }
            AuthError::ConfigError(msg) => {
                tracing::error!("Auth configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication is misconfigured".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
