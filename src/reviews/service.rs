use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::Actor;
use crate::cache::{self, CatalogEvent, DerivedCache};
use crate::games::repository::{GameCatalog, GameRepository};
use crate::reviews::{
    CreateReviewRequest, RatingAggregator, Review, ReviewAggregates, ReviewRepository,
    ReviewStore, ServiceError, UpdateReviewRequest,
};

/// Production aggregator wiring: review store + catalog store
pub type Aggregator = RatingAggregator<ReviewRepository, GameRepository>;

/// Service layer for review business logic
///
/// Every mutation recomputes the game's aggregate rating in the same unit
/// of work and applies the review row of the cache-invalidation table.
#[derive(Clone)]
pub struct ReviewService<
    S: ReviewStore = ReviewRepository,
    R: ReviewAggregates = ReviewRepository,
    G: GameCatalog = GameRepository,
> {
    repository: S,
    aggregator: RatingAggregator<R, G>,
    cache: Arc<dyn DerivedCache>,
}

impl<S, R, G> ReviewService<S, R, G>
where
    S: ReviewStore,
    R: ReviewAggregates,
    G: GameCatalog,
{
    /// Create a new ReviewService
    pub fn new(
        repository: S,
        aggregator: RatingAggregator<R, G>,
        cache: Arc<dyn DerivedCache>,
    ) -> Self {
        Self {
            repository,
            aggregator,
            cache,
        }
    }

    /// Create a new review
    ///
    /// 1. Validates the request
    /// 2. Verifies the game exists
    /// 3. Rejects a second review by the same user for the same game
    /// 4. Creates the review
    /// 5. Recomputes the game's aggregate rating and invalidates caches
    pub async fn create_review(
        &self,
        actor: &Actor,
        game_id: Uuid,
        request: CreateReviewRequest,
    ) -> Result<Review, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))?;

        if !self.repository.game_exists(game_id).await? {
            return Err(ServiceError::GameNotFound);
        }

        if self
            .repository
            .find_by_user_and_game(actor.user_id, game_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicateReview);
        }

        let review = self
            .repository
            .create(actor.user_id, game_id, request.rating, request.comment)
            .await?;
        info!("User {} reviewed game {}", actor.user_id, game_id);

        self.refresh_aggregates(game_id).await;
        Ok(review)
    }

    /// Update an existing review (author only)
    pub async fn update_review(
        &self,
        actor: &Actor,
        review_id: Uuid,
        request: UpdateReviewRequest,
    ) -> Result<Review, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))?;

        let existing = self
            .repository
            .find_by_id(review_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if existing.user_id != actor.user_id {
            return Err(ServiceError::Forbidden);
        }

        let updated = self
            .repository
            .update(review_id, request.rating, request.comment)
            .await?;

        self.refresh_aggregates(existing.game_id).await;
        Ok(updated)
    }

    /// Delete a review (author or admin)
    pub async fn delete_review(&self, actor: &Actor, review_id: Uuid) -> Result<(), ServiceError> {
        let existing = self
            .repository
            .find_by_id(review_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if existing.user_id != actor.user_id && !actor.role.is_admin() {
            return Err(ServiceError::Forbidden);
        }

        let game_id = existing.game_id;
        self.repository.delete(review_id).await?;
        info!("Review {} deleted by {}", review_id, actor.user_id);

        self.refresh_aggregates(game_id).await;
        Ok(())
    }

    /// Reviews for a game, newest first
    pub async fn list_for_game(
        &self,
        game_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Vec<Review>, ServiceError> {
        if !self.repository.game_exists(game_id).await? {
            return Err(ServiceError::GameNotFound);
        }

        self.repository
            .find_by_game(game_id, page.max(0), size.clamp(1, 100))
            .await
    }

    /// Recompute the aggregate and drop the derived caches the change
    /// affects. Neither step may fail the review mutation itself: the
    /// review is already persisted, and a stale aggregate is repaired by
    /// the next recompute.
    async fn refresh_aggregates(&self, game_id: Uuid) {
        if let Err(e) = self.aggregator.recompute(game_id).await {
            error!("Aggregate refresh failed for game {}: {}", game_id, e);
        }

        cache::apply(self.cache.as_ref(), CatalogEvent::ReviewChanged { game_id }).await;
    }
}
