// HTTP handlers for review endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::reviews::{
    CreateReviewRequest, ReviewResponse, ServiceError, UpdateReviewRequest,
};
use crate::AppState;

/// Pagination query parameters for review listings
#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

fn default_page_size() -> i64 {
    20
}

/// Create a new review for a game
/// POST /api/games/{id}/reviews
pub async fn create_review_handler(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(game_id): Path<Uuid>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ServiceError> {
    let review = state.reviews.create_review(&actor, game_id, request).await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

/// Update an existing review
/// PUT /api/reviews/{id}
pub async fn update_review_handler(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(review_id): Path<Uuid>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, ServiceError> {
    let review = state
        .reviews
        .update_review(&actor, review_id, request)
        .await?;
    Ok(Json(review.into()))
}

/// Delete a review
/// DELETE /api/reviews/{id}
pub async fn delete_review_handler(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(review_id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.reviews.delete_review(&actor, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List reviews for a game, newest first
/// GET /api/games/{id}/reviews
pub async fn list_reviews_handler(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<ReviewResponse>>, ServiceError> {
    let reviews = state
        .reviews
        .list_for_game(game_id, params.page, params.size)
        .await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}
