// HTTP handlers for catalog-import endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::middleware::AdminUser;
use crate::error::ApiError;
use crate::games::models::GameResponse;
use crate::AppState;

/// Request DTO for importing a game by title
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ImportGameRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
}

/// Import a game from the external catalog provider (admin only)
/// POST /api/admin/import/games
#[utoipa::path(
    post,
    path = "/api/admin/import/games",
    request_body = ImportGameRequest,
    responses(
        (status = 201, description = "Game imported successfully", body = GameResponse),
        (status = 404, description = "Provider knows no game with that title"),
        (status = 409, description = "Game already exists in the catalog"),
        (status = 403, description = "Actor is not an administrator"),
    ),
    security(("bearer_auth" = [])),
    tag = "imports"
)]
pub async fn import_game_handler(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    Json(request): Json<ImportGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    request.validate()?;
    tracing::debug!("Admin {} importing '{}'", actor.user_id, request.title);

    let game = state.imports.import_by_title(&request.title).await?;
    Ok((StatusCode::CREATED, Json(game.into())))
}
