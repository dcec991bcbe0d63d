// HTTP handlers for price-sync endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::middleware::{AdminUser, AuthenticatedUser};
use crate::error::ApiError;
use crate::AppState;

/// Confirmation for a queued bulk resync
#[derive(Debug, Serialize, ToSchema)]
pub struct ResyncResponse {
    pub queued: usize,
}

/// Queue a price refresh for one game (admin only)
/// POST /api/games/{id}/price-sync
#[utoipa::path(
    post,
    path = "/api/games/{id}/price-sync",
    params(("id" = Uuid, Path, description = "Game ID")),
    responses(
        (status = 202, description = "Price refresh queued"),
        (status = 403, description = "Actor is not an administrator"),
    ),
    security(("bearer_auth" = [])),
    tag = "pricing"
)]
pub async fn sync_game_prices_handler(
    State(state): State<AppState>,
    AdminUser(_actor): AdminUser,
    Path(game_id): Path<Uuid>,
) -> StatusCode {
    state.pricing.request_sync(game_id).await;
    StatusCode::ACCEPTED
}

/// Queue a price refresh for the whole catalog
/// POST /api/admin/price-sync
#[utoipa::path(
    post,
    path = "/api/admin/price-sync",
    responses(
        (status = 202, description = "Catalog-wide price refresh queued", body = ResyncResponse),
        (status = 422, description = "Actor is not an administrator"),
    ),
    security(("bearer_auth" = [])),
    tag = "pricing"
)]
pub async fn sync_all_prices_handler(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<(StatusCode, Json<ResyncResponse>), ApiError> {
    let queued = state.pricing.request_sync_all_admin(&actor).await?;
    Ok((StatusCode::ACCEPTED, Json(ResyncResponse { queued })))
}
