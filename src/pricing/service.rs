use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::auth::models::Actor;
use crate::cache::{keys, DerivedCache};
use crate::error::ApiError;
use crate::games::repository::{GameCatalog, GameRepository};
use crate::pricing::queue::WorkQueue;

/// Producer side of the price-sync pipeline
///
/// Enqueues work; never talks to the pricing provider itself. Requests
/// for a single game are fire-and-forget so a Redis hiccup cannot fail
/// the catalog mutation that triggered them.
#[derive(Clone)]
pub struct PriceSyncService {
    games: GameRepository,
    queue: Arc<dyn WorkQueue>,
    cache: Arc<dyn DerivedCache>,
}

impl PriceSyncService {
    /// Create a new PriceSyncService
    pub fn new(
        games: GameRepository,
        queue: Arc<dyn WorkQueue>,
        cache: Arc<dyn DerivedCache>,
    ) -> Self {
        Self {
            games,
            queue,
            cache,
        }
    }

    /// Queue a price refresh for one game, logging instead of failing
    pub async fn request_sync(&self, game_id: Uuid) {
        let id = game_id.to_string();
        match self.queue.enqueue(&id).await {
            Ok(()) => info!("Queued price sync for game {}", id),
            Err(e) => error!("Could not queue price sync for game {}: {}", id, e),
        }
    }

    /// Queue a price refresh for every game in the catalog
    ///
    /// Returns how many games were queued. Used by the daily schedule
    /// and by the admin resync endpoint.
    pub async fn request_sync_all(&self) -> Result<usize, ApiError> {
        let ids = self.games.list_ids().await?;
        let total = ids.len();

        for id in ids {
            self.queue
                .enqueue(&id.to_string())
                .await
                .map_err(|e| ApiError::InternalError(format!("Queue unavailable: {}", e)))?;
        }

        info!("Queued price sync for {} game(s)", total);
        Ok(total)
    }

    /// Admin-triggered global resync
    ///
    /// Drops every cached game detail up front so readers see fresh
    /// prices as soon as each game is reprocessed.
    pub async fn request_sync_all_admin(&self, actor: &Actor) -> Result<usize, ApiError> {
        if !actor.role.is_admin() {
            return Err(ApiError::BusinessRule {
                message: "Only administrators may trigger a global price resync".to_string(),
            });
        }

        self.cache.invalidate_prefix(keys::GAME_DETAIL_PREFIX).await;
        self.request_sync_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use sqlx::postgres::PgPoolOptions;

    use crate::auth::models::Role;
    use crate::cache::store::memory::MemoryCache;
    use crate::pricing::error::QueueError;

    /// Queue fake recording every enqueued id
    #[derive(Default)]
    struct FakeQueue {
        enqueued: Mutex<Vec<String>>,
    }

    #[axum::async_trait]
    impl WorkQueue for FakeQueue {
        async fn enqueue(&self, game_id: &str) -> Result<(), QueueError> {
            self.enqueued.lock().unwrap().push(game_id.to_string());
            Ok(())
        }
    }

    fn service_with(queue: Arc<FakeQueue>, cache: Arc<MemoryCache>) -> PriceSyncService {
        // The pool is never touched by these tests
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        PriceSyncService::new(GameRepository::new(pool), queue, cache)
    }

    #[tokio::test]
    async fn single_sync_enqueues_the_game_id() {
        let queue = Arc::new(FakeQueue::default());
        let cache = Arc::new(MemoryCache::new());
        let service = service_with(queue.clone(), cache);

        let game_id = Uuid::new_v4();
        service.request_sync(game_id).await;

        let enqueued = queue.enqueued.lock().unwrap();
        assert_eq!(enqueued.as_slice(), &[game_id.to_string()]);
    }

    #[tokio::test]
    async fn non_admin_cannot_trigger_global_resync() {
        let queue = Arc::new(FakeQueue::default());
        let cache = Arc::new(MemoryCache::new());
        let service = service_with(queue.clone(), cache.clone());

        let detail_key = keys::game_detail_key(Uuid::new_v4());
        cache.put(&detail_key, "cached").await;

        let actor = Actor {
            user_id: Uuid::new_v4(),
            role: Role::User,
        };
        let result = service.request_sync_all_admin(&actor).await;

        assert!(matches!(result, Err(ApiError::BusinessRule { .. })));
        // Rejected before any side effect
        assert!(queue.enqueued.lock().unwrap().is_empty());
        assert!(cache.contains(&detail_key));
    }
}
