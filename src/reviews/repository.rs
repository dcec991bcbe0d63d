use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::games::repository::CatalogError;
use crate::reviews::{AggregationResult, Review, ServiceError};

/// The one aggregation the rating pipeline needs from the review store
///
/// The count and mean are computed server-side in a single query; reviews
/// are never loaded into memory for this.
#[async_trait]
pub trait ReviewAggregates: Send + Sync {
    /// `None` when the game currently has no reviews
    async fn aggregate_for_game(
        &self,
        game_id: Uuid,
    ) -> Result<Option<AggregationResult>, CatalogError>;
}

/// The review-store operations the service layer needs
///
/// `ReviewRepository` is the production implementation; tests drive the
/// service through an in-memory one.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Create a new review
    async fn create(
        &self,
        user_id: Uuid,
        game_id: Uuid,
        rating: i16,
        comment: Option<String>,
    ) -> Result<Review, ServiceError>;

    /// Find a review by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, ServiceError>;

    /// Find a review by user and game (for duplicate detection)
    async fn find_by_user_and_game(
        &self,
        user_id: Uuid,
        game_id: Uuid,
    ) -> Result<Option<Review>, ServiceError>;

    /// Update a review, keeping existing values for omitted fields
    async fn update(
        &self,
        id: Uuid,
        rating: Option<i16>,
        comment: Option<String>,
    ) -> Result<Review, ServiceError>;

    /// Delete a review
    async fn delete(&self, id: Uuid) -> Result<(), ServiceError>;

    /// Reviews for a game, newest first, paginated
    async fn find_by_game(
        &self,
        game_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Vec<Review>, ServiceError>;

    /// Check if a game exists
    async fn game_exists(&self, game_id: Uuid) -> Result<bool, ServiceError>;
}

/// Repository for database operations on reviews
#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    /// Create a new ReviewRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for ReviewRepository {
    async fn create(
        &self,
        user_id: Uuid,
        game_id: Uuid,
        rating: i16,
        comment: Option<String>,
    ) -> Result<Review, ServiceError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (user_id, game_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, game_id, rating, comment, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(game_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, ServiceError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, user_id, game_id, rating, comment, created_at, updated_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn find_by_user_and_game(
        &self,
        user_id: Uuid,
        game_id: Uuid,
    ) -> Result<Option<Review>, ServiceError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, user_id, game_id, rating, comment, created_at, updated_at
            FROM reviews
            WHERE user_id = $1 AND game_id = $2
            "#,
        )
        .bind(user_id)
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn update(
        &self,
        id: Uuid,
        rating: Option<i16>,
        comment: Option<String>,
    ) -> Result<Review, ServiceError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET rating = COALESCE($1, rating),
                comment = COALESCE($2, comment),
                updated_at = NOW()
            WHERE id = $3
            RETURNING id, user_id, game_id, rating, comment, created_at, updated_at
            "#,
        )
        .bind(rating)
        .bind(comment)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound);
        }

        Ok(())
    }

    async fn find_by_game(
        &self,
        game_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Vec<Review>, ServiceError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, user_id, game_id, rating, comment, created_at, updated_at
            FROM reviews
            WHERE game_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(game_id)
        .bind(size)
        .bind(page * size)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn game_exists(&self, game_id: Uuid) -> Result<bool, ServiceError> {
        let exists: Option<bool> =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM games WHERE id = $1)")
                .bind(game_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.unwrap_or(false))
    }
}

#[async_trait]
impl ReviewAggregates for ReviewRepository {
    async fn aggregate_for_game(
        &self,
        game_id: Uuid,
    ) -> Result<Option<AggregationResult>, CatalogError> {
        // COUNT/AVG in one server-side pass; AVG is NULL when no rows match
        let (review_count, mean_rating): (i64, Option<f64>) = sqlx::query_as(
            r#"
            SELECT COUNT(*), AVG(rating::float8)
            FROM reviews
            WHERE game_id = $1
            "#,
        )
        .bind(game_id)
        .fetch_one(&self.pool)
        .await
        .map_err(CatalogError::from)?;

        Ok(mean_rating.map(|mean_rating| AggregationResult {
            game_id,
            mean_rating,
            review_count,
        }))
    }
}
