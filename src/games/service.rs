use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::cache::{
    self, game_detail_key, CatalogEvent, DerivedCache, NEWEST_RELEASES_KEY, TOP_RATED_KEY,
};
use crate::error::ApiError;
use crate::games::models::{
    CreateGameRequest, Game, GameDetailResponse, GameResponse, PatchGenresRequest,
    UpdateGameRequest,
};
use crate::games::repository::{GameRepository, GameStore};
use crate::pricing::PriceSyncService;

/// Service layer for catalog operations on games
///
/// Every mutation applies its row of the cache-invalidation table; the
/// read paths for detail / top-rated / newest go through the derived
/// cache (populate on miss, no expiry beyond explicit invalidation).
#[derive(Clone)]
pub struct GameService<S: GameStore = GameRepository> {
    repository: S,
    cache: Arc<dyn DerivedCache>,
    price_sync: PriceSyncService,
}

impl<S: GameStore> GameService<S> {
    /// Create a new GameService
    pub fn new(
        repository: S,
        cache: Arc<dyn DerivedCache>,
        price_sync: PriceSyncService,
    ) -> Self {
        Self {
            repository,
            cache,
            price_sync,
        }
    }

    /// Create a game and request its first price sync
    pub async fn create_game(&self, request: CreateGameRequest) -> Result<Game, ApiError> {
        request.validate()?;

        let game = self.repository.create(&request).await?;
        info!("Created game '{}' with id {}", game.title, game.id);

        cache::apply(self.cache.as_ref(), CatalogEvent::GameCreated).await;

        // Fire-and-forget: the catalog answer does not wait for pricing
        self.price_sync.request_sync(game.id).await;

        Ok(game)
    }

    /// Find a game by exact title (catalog-import duplicate check)
    pub async fn find_by_title(&self, title: &str) -> Result<Option<Game>, ApiError> {
        self.repository.find_by_title(title).await
    }

    /// Update a game's fields
    pub async fn update_game(
        &self,
        game_id: Uuid,
        request: UpdateGameRequest,
    ) -> Result<Game, ApiError> {
        request.validate()?;

        let game = self.repository.update(game_id, &request).await?;
        cache::apply(self.cache.as_ref(), CatalogEvent::GameUpdated { game_id }).await;

        Ok(game)
    }

    /// Replace a game's genre list
    pub async fn patch_genres(
        &self,
        game_id: Uuid,
        request: PatchGenresRequest,
    ) -> Result<Game, ApiError> {
        request.validate()?;

        let game = self.repository.patch_genres(game_id, &request.genres).await?;
        cache::apply(self.cache.as_ref(), CatalogEvent::GameUpdated { game_id }).await;

        Ok(game)
    }

    /// Delete a game
    pub async fn delete_game(&self, game_id: Uuid) -> Result<(), ApiError> {
        self.repository.delete(game_id).await?;
        info!("Deleted game {}", game_id);

        cache::apply(self.cache.as_ref(), CatalogEvent::GameDeleted { game_id }).await;
        Ok(())
    }

    /// Detail view, served from the derived cache when present
    pub async fn get_detail(&self, game_id: Uuid) -> Result<GameDetailResponse, ApiError> {
        let key = game_detail_key(game_id);

        if let Some(cached) = self.cache.get(&key).await {
            match serde_json::from_str(&cached) {
                Ok(detail) => {
                    debug!("Game detail cache hit for {}", game_id);
                    return Ok(detail);
                }
                Err(e) => {
                    // Treat an undecodable entry as a miss and rebuild it
                    warn!("Dropping undecodable cache entry '{}': {}", key, e);
                    self.cache.invalidate(&key).await;
                }
            }
        }

        let game = self
            .repository
            .find_by_id(game_id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: "Game".to_string(),
                id: game_id.to_string(),
            })?;
        let offers = self.repository.find_offers(game_id).await?;

        let detail = GameDetailResponse::from_parts(game, offers);
        if let Ok(serialized) = serde_json::to_string(&detail) {
            self.cache.put(&key, &serialized).await;
        }

        Ok(detail)
    }

    /// Top 10 games by rating, served from the derived cache when present
    pub async fn top_rated(&self) -> Result<Vec<GameResponse>, ApiError> {
        self.cached_listing(TOP_RATED_KEY, || self.repository.top_rated())
            .await
    }

    /// Top 10 games by release date, served from the derived cache when present
    pub async fn newest_releases(&self) -> Result<Vec<GameResponse>, ApiError> {
        self.cached_listing(NEWEST_RELEASES_KEY, || self.repository.newest_releases())
            .await
    }

    async fn cached_listing<F, Fut>(&self, key: &str, load: F) -> Result<Vec<GameResponse>, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<Game>, ApiError>>,
    {
        if let Some(cached) = self.cache.get(key).await {
            if let Ok(listing) = serde_json::from_str(&cached) {
                debug!("Listing cache hit for '{}'", key);
                return Ok(listing);
            }
            warn!("Dropping undecodable cache entry '{}'", key);
            self.cache.invalidate(key).await;
        }

        let listing: Vec<GameResponse> = load().await?.into_iter().map(Into::into).collect();
        if let Ok(serialized) = serde_json::to_string(&listing) {
            self.cache.put(key, &serialized).await;
        }

        Ok(listing)
    }
}
