use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::games::models::{CreateGameRequest, Game, GameSummary, PriceOffer, UpdateGameRequest};

const GAME_COLUMNS: &str = "id, title, description, cover_url, genres, company_id, release_date, \
     average_rating, review_count, last_price_sync, created_at";

/// Catalog-store error as seen by the pipeline components
///
/// The price-sync consumer and the rating aggregator only need to know
/// that the store failed, not which driver error occurred; those details
/// are logged at the repository boundary.
#[derive(Debug, thiserror::Error)]
#[error("catalog store error: {0}")]
pub struct CatalogError(pub String);

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError(e.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        ApiError::InternalError(e.to_string())
    }
}

/// The catalog-store operations the price-sync and rating pipelines need
///
/// `GameRepository` is the production implementation; tests substitute an
/// in-memory one.
#[async_trait]
pub trait GameCatalog: Send + Sync {
    /// Load the id + title slice of one game, `None` if it no longer exists
    async fn find_summary(&self, game_id: Uuid) -> Result<Option<GameSummary>, CatalogError>;

    /// Replace the game's whole offer list and stamp `last_price_sync`
    async fn replace_offers(
        &self,
        game_id: Uuid,
        offers: &[PriceOffer],
    ) -> Result<(), CatalogError>;

    /// Persist a freshly recomputed aggregate rating
    async fn update_rating(&self, game_id: Uuid, rating: f64, count: i32)
        -> Result<(), CatalogError>;

    /// Every game id in the catalog (bulk sync enumeration)
    async fn list_ids(&self) -> Result<Vec<Uuid>, CatalogError>;
}

#[async_trait]
impl<T: GameCatalog + ?Sized> GameCatalog for std::sync::Arc<T> {
    async fn find_summary(&self, game_id: Uuid) -> Result<Option<GameSummary>, CatalogError> {
        (**self).find_summary(game_id).await
    }

    async fn replace_offers(
        &self,
        game_id: Uuid,
        offers: &[PriceOffer],
    ) -> Result<(), CatalogError> {
        (**self).replace_offers(game_id, offers).await
    }

    async fn update_rating(
        &self,
        game_id: Uuid,
        rating: f64,
        count: i32,
    ) -> Result<(), CatalogError> {
        (**self).update_rating(game_id, rating, count).await
    }

    async fn list_ids(&self) -> Result<Vec<Uuid>, CatalogError> {
        (**self).list_ids().await
    }
}

/// The catalog-store operations the request-facing service layer needs
///
/// Split from [`GameCatalog`] because the HTTP path and the pipeline want
/// different slices of the store; tests drive the service through an
/// in-memory implementation.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Insert a new game
    async fn create(&self, request: &CreateGameRequest) -> Result<Game, ApiError>;

    /// Find a game by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Game>, ApiError>;

    /// Find a game by exact title, case-insensitive (import duplicate check)
    async fn find_by_title(&self, title: &str) -> Result<Option<Game>, ApiError>;

    /// Update a game, keeping existing values for omitted fields
    async fn update(&self, id: Uuid, request: &UpdateGameRequest) -> Result<Game, ApiError>;

    /// Replace a game's genre list
    async fn patch_genres(&self, id: Uuid, genres: &[String]) -> Result<Game, ApiError>;

    /// Delete a game; offers and reviews cascade
    async fn delete(&self, id: Uuid) -> Result<(), ApiError>;

    /// Top 10 games by aggregate rating
    async fn top_rated(&self) -> Result<Vec<Game>, ApiError>;

    /// Top 10 games by release date
    async fn newest_releases(&self) -> Result<Vec<Game>, ApiError>;

    /// Current offer list for a game
    async fn find_offers(&self, game_id: Uuid) -> Result<Vec<PriceOffer>, ApiError>;
}

/// Repository for database operations on games
#[derive(Clone)]
pub struct GameRepository {
    pool: PgPool,
}

impl GameRepository {
    /// Create a new GameRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameStore for GameRepository {
    async fn create(&self, request: &CreateGameRequest) -> Result<Game, ApiError> {
        let game = sqlx::query_as::<_, Game>(&format!(
            r#"
            INSERT INTO games (title, description, cover_url, genres, company_id, release_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {GAME_COLUMNS}
            "#,
        ))
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.cover_url)
        .bind(&request.genres)
        .bind(request.company_id)
        .bind(request.release_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(game)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Game>, ApiError> {
        let game = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(game)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Game>, ApiError> {
        let game = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE LOWER(title) = LOWER($1) LIMIT 1",
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(game)
    }

    async fn update(&self, id: Uuid, request: &UpdateGameRequest) -> Result<Game, ApiError> {
        // Transaction so the existing-row read and the write are atomic
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Game".to_string(),
            id: id.to_string(),
        })?;

        let updated = sqlx::query_as::<_, Game>(&format!(
            r#"
            UPDATE games
            SET title = $1, description = $2, cover_url = $3, release_date = $4
            WHERE id = $5
            RETURNING {GAME_COLUMNS}
            "#,
        ))
        .bind(request.title.clone().unwrap_or(existing.title))
        .bind(request.description.clone().or(existing.description))
        .bind(request.cover_url.clone().or(existing.cover_url))
        .bind(request.release_date.or(existing.release_date))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn patch_genres(&self, id: Uuid, genres: &[String]) -> Result<Game, ApiError> {
        let game = sqlx::query_as::<_, Game>(&format!(
            "UPDATE games SET genres = $1 WHERE id = $2 RETURNING {GAME_COLUMNS}",
        ))
        .bind(genres)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Game".to_string(),
            id: id.to_string(),
        })?;

        Ok(game)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: "Game".to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }

    async fn top_rated(&self) -> Result<Vec<Game>, ApiError> {
        let games = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games ORDER BY average_rating DESC, review_count DESC LIMIT 10",
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(games)
    }

    async fn newest_releases(&self) -> Result<Vec<Game>, ApiError> {
        let games = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games ORDER BY release_date DESC NULLS LAST LIMIT 10",
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(games)
    }

    async fn find_offers(&self, game_id: Uuid) -> Result<Vec<PriceOffer>, ApiError> {
        let offers = sqlx::query_as::<_, PriceOffer>(
            r#"
            SELECT store_name, price_current, price_base, discount_percent, shop_url
            FROM price_offers
            WHERE game_id = $1
            ORDER BY price_current ASC
            "#,
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(offers)
    }
}

#[async_trait]
impl GameCatalog for GameRepository {
    async fn find_summary(&self, game_id: Uuid) -> Result<Option<GameSummary>, CatalogError> {
        let summary = sqlx::query_as::<_, GameSummary>(
            "SELECT id, title FROM games WHERE id = $1",
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(summary)
    }

    async fn replace_offers(
        &self,
        game_id: Uuid,
        offers: &[PriceOffer],
    ) -> Result<(), CatalogError> {
        // Wholesale replacement: the delete, the inserts and the sync
        // timestamp land atomically or not at all.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM price_offers WHERE game_id = $1")
            .bind(game_id)
            .execute(&mut *tx)
            .await?;

        for offer in offers {
            sqlx::query(
                r#"
                INSERT INTO price_offers
                    (game_id, store_name, price_current, price_base, discount_percent, shop_url)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(game_id)
            .bind(&offer.store_name)
            .bind(offer.price_current)
            .bind(offer.price_base)
            .bind(offer.discount_percent)
            .bind(&offer.shop_url)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE games SET last_price_sync = NOW() WHERE id = $1")
            .bind(game_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_rating(
        &self,
        game_id: Uuid,
        rating: f64,
        count: i32,
    ) -> Result<(), CatalogError> {
        sqlx::query("UPDATE games SET average_rating = $1, review_count = $2 WHERE id = $3")
            .bind(rating)
            .bind(count)
            .bind(game_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<Uuid>, CatalogError> {
        let ids: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM games")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
