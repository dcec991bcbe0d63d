use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::fmt;

/// Service-level errors for the review system
#[derive(Debug)]
pub enum ServiceError {
    /// Review not found
    NotFound,

    /// User has already reviewed this game
    DuplicateReview,

    /// User does not own this review (and is not an admin where that matters)
    Forbidden,

    /// Validation error with details
    ValidationError(String),

    /// Game not found
    GameNotFound,

    /// Database error
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::NotFound => write!(f, "Review not found"),
            ServiceError::DuplicateReview => {
                write!(f, "Duplicate review: user has already reviewed this game")
            }
            ServiceError::Forbidden => {
                write!(f, "Forbidden: user may not modify this review")
            }
            ServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ServiceError::GameNotFound => write!(f, "Game not found"),
            ServiceError::DatabaseError(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::DatabaseError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::DatabaseError(err)
    }
}

/// Error response structure for API responses
#[derive(Serialize)]
pub struct ReviewErrorBody {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ServiceError::NotFound => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Review not found".to_string(),
            ),
            ServiceError::DuplicateReview => (
                StatusCode::CONFLICT,
                "DUPLICATE_REVIEW",
                "User has already reviewed this game".to_string(),
            ),
            ServiceError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "User may not modify this review".to_string(),
            ),
            ServiceError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ServiceError::GameNotFound => (
                StatusCode::NOT_FOUND,
                "GAME_NOT_FOUND",
                "Game not found".to_string(),
            ),
            ServiceError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ReviewErrorBody {
            error: error_type.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
