// HTTP handlers for game endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::middleware::AdminUser;
use crate::error::ApiError;
use crate::games::models::{
    CreateGameRequest, GameDetailResponse, GameResponse, PatchGenresRequest, UpdateGameRequest,
};
use crate::AppState;

/// Create a new game (admin only)
/// POST /api/games
#[utoipa::path(
    post,
    path = "/api/games",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created successfully", body = GameResponse),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Actor is not an administrator"),
    ),
    security(("bearer_auth" = [])),
    tag = "games"
)]
pub async fn create_game_handler(
    State(state): State<AppState>,
    AdminUser(actor): AdminUser,
    Json(request): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    tracing::debug!("Admin {} creating game '{}'", actor.user_id, request.title);

    let game = state.games.create_game(request).await?;
    Ok((StatusCode::CREATED, Json(game.into())))
}

/// Get a game's detail view (cached)
/// GET /api/games/{id}
#[utoipa::path(
    get,
    path = "/api/games/{id}",
    params(("id" = Uuid, Path, description = "Game ID")),
    responses(
        (status = 200, description = "Game found", body = GameDetailResponse),
        (status = 404, description = "Game not found"),
    ),
    tag = "games"
)]
pub async fn get_game_detail_handler(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameDetailResponse>, ApiError> {
    let detail = state.games.get_detail(game_id).await?;
    Ok(Json(detail))
}

/// Update a game (admin only)
/// PUT /api/games/{id}
pub async fn update_game_handler(
    State(state): State<AppState>,
    AdminUser(_actor): AdminUser,
    Path(game_id): Path<Uuid>,
    Json(request): Json<UpdateGameRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let game = state.games.update_game(game_id, request).await?;
    Ok(Json(game.into()))
}

/// Replace a game's genres (admin only)
/// PATCH /api/games/{id}/genres
pub async fn patch_genres_handler(
    State(state): State<AppState>,
    AdminUser(_actor): AdminUser,
    Path(game_id): Path<Uuid>,
    Json(request): Json<PatchGenresRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let game = state.games.patch_genres(game_id, request).await?;
    Ok(Json(game.into()))
}

/// Delete a game (admin only)
/// DELETE /api/games/{id}
pub async fn delete_game_handler(
    State(state): State<AppState>,
    AdminUser(_actor): AdminUser,
    Path(game_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.games.delete_game(game_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Top 10 games by aggregate rating (cached)
/// GET /api/games/top-rated
#[utoipa::path(
    get,
    path = "/api/games/top-rated",
    responses((status = 200, description = "Top-rated games", body = Vec<GameResponse>)),
    tag = "games"
)]
pub async fn top_rated_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<GameResponse>>, ApiError> {
    Ok(Json(state.games.top_rated().await?))
}

/// Top 10 games by release date (cached)
/// GET /api/games/newest
pub async fn newest_releases_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<GameResponse>>, ApiError> {
    Ok(Json(state.games.newest_releases().await?))
}
