use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Domain model representing a game in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Game {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub genres: Vec<String>,
    pub company_id: Option<Uuid>,
    pub release_date: Option<NaiveDate>,
    pub average_rating: f64,
    pub review_count: i32,
    pub last_price_sync: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One store's current price listing for a game
///
/// Offers are immutable once attached; a successful price sync replaces a
/// game's whole offer list, never merges into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PriceOffer {
    pub store_name: String,
    pub price_current: f64,
    pub price_base: f64,
    pub discount_percent: i32,
    pub shop_url: String,
}

/// The slice of a game the price-sync pipeline needs
#[derive(Debug, Clone, FromRow)]
pub struct GameSummary {
    pub id: Uuid,
    pub title: String,
}

/// Request DTO for creating a game
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateGameRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(max = 4000, message = "Description must not exceed 4000 characters"))]
    pub description: Option<String>,
    #[validate(url(message = "Cover URL must be a valid URL"))]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub company_id: Option<Uuid>,
    pub release_date: Option<NaiveDate>,
}

/// Request DTO for updating a game; omitted fields keep their values
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGameRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 4000, message = "Description must not exceed 4000 characters"))]
    pub description: Option<String>,
    #[validate(url(message = "Cover URL must be a valid URL"))]
    pub cover_url: Option<String>,
    pub release_date: Option<NaiveDate>,
}

/// Request DTO for replacing a game's genre list
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PatchGenresRequest {
    #[validate(length(min = 1, message = "At least one genre is required"))]
    pub genres: Vec<String>,
}

/// List-view response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GameResponse {
    pub id: Uuid,
    pub title: String,
    pub cover_url: Option<String>,
    pub genres: Vec<String>,
    pub average_rating: f64,
    pub review_count: i32,
    pub release_date: Option<NaiveDate>,
}

impl From<Game> for GameResponse {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            title: game.title,
            cover_url: game.cover_url,
            genres: game.genres,
            average_rating: game.average_rating,
            review_count: game.review_count,
            release_date: game.release_date,
        }
    }
}

/// Detail-view response DTO, served through the derived cache
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GameDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub genres: Vec<String>,
    pub company_id: Option<Uuid>,
    pub release_date: Option<NaiveDate>,
    pub average_rating: f64,
    pub review_count: i32,
    pub offers: Vec<PriceOffer>,
    pub last_price_sync: Option<DateTime<Utc>>,
}

impl GameDetailResponse {
    pub fn from_parts(game: Game, offers: Vec<PriceOffer>) -> Self {
        Self {
            id: game.id,
            title: game.title,
            description: game.description,
            cover_url: game.cover_url,
            genres: game.genres,
            company_id: game.company_id,
            release_date: game.release_date,
            average_rating: game.average_rating,
            review_count: game.review_count,
            offers,
            last_price_sync: game.last_price_sync,
        }
    }
}
