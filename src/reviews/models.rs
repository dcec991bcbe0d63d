use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Domain model representing a review in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of one rating-aggregation query: never persisted on its own,
/// always written back onto the game record
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub game_id: Uuid,
    pub mean_rating: f64,
    pub review_count: i64,
}

/// Request DTO for creating a new review
#[derive(Debug, Deserialize, Validate, Clone, ToSchema)]
pub struct CreateReviewRequest {
    #[validate(range(min = 0, max = 10, message = "Rating must be between 0 and 10"))]
    pub rating: i16,
    #[validate(length(max = 1000, message = "Comment must not exceed 1000 characters"))]
    pub comment: Option<String>,
}

/// Request DTO for updating an existing review
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 0, max = 10, message = "Rating must be between 0 and 10"))]
    pub rating: Option<i16>,
    #[validate(length(max = 1000, message = "Comment must not exceed 1000 characters"))]
    pub comment: Option<String>,
}

/// Response DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            game_id: review.game_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_rating_above_scale() {
        let request = CreateReviewRequest {
            rating: 11,
            comment: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn accepts_rating_on_scale_bounds() {
        for rating in [0, 10] {
            let request = CreateReviewRequest {
                rating,
                comment: None,
            };
            assert!(request.validate().is_ok());
        }
    }
}
