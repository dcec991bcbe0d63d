// Price-sync queue consumer
//
// Single worker pulling game ids off the Redis queue one at a time. The
// provider rate-limits aggressively, so a fixed cooldown follows every
// successful update; skips and failures move on immediately. Every
// message is acknowledged whatever the outcome, so one bad id can never
// wedge the queue.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::cache::{self, CatalogEvent, DerivedCache};
use crate::games::repository::GameCatalog;
use crate::pricing::client::OfferSource;
use crate::pricing::queue::PriceSyncQueue;

const RECEIVE_TIMEOUT_SECS: f64 = 5.0;

/// What happened to one queue message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Offers were fetched and persisted
    Succeeded,
    /// The provider had nothing for this game; the stored offers stand
    NoOffers,
    /// The game is gone from the catalog or the id was malformed
    SkippedNotFound,
    /// A transient store failure; a later enqueue will retry
    FailedRetryable,
}

/// Worker that turns queued game ids into fresh price offers
pub struct PriceSyncConsumer<G, P> {
    games: G,
    provider: P,
    cache: Arc<dyn DerivedCache>,
    cooldown: Duration,
}

impl<G, P> PriceSyncConsumer<G, P>
where
    G: GameCatalog,
    P: OfferSource,
{
    pub fn new(games: G, provider: P, cache: Arc<dyn DerivedCache>, cooldown: Duration) -> Self {
        Self {
            games,
            provider,
            cache,
            cooldown,
        }
    }

    /// Process one queue message end to end
    pub async fn process(&self, message: &str) -> SyncOutcome {
        let game_id = match message.parse::<Uuid>() {
            Ok(id) => id,
            Err(_) => {
                warn!("Discarding malformed queue message '{}'", message);
                return SyncOutcome::SkippedNotFound;
            }
        };

        let summary = match self.games.find_summary(game_id).await {
            Ok(Some(summary)) => summary,
            Ok(None) => {
                // Deleted between enqueue and processing
                warn!("Game {} no longer exists, skipping price sync", game_id);
                return SyncOutcome::SkippedNotFound;
            }
            Err(e) => {
                error!("Could not load game {} for price sync: {}", game_id, e);
                return SyncOutcome::FailedRetryable;
            }
        };

        let offers = self.provider.fetch_offers(&summary.title).await;
        if offers.is_empty() {
            info!("No offers found for '{}', keeping stored prices", summary.title);
            return SyncOutcome::NoOffers;
        }

        match self.games.replace_offers(game_id, &offers).await {
            Ok(()) => {
                info!(
                    "Updated {} offer(s) for '{}' ({})",
                    offers.len(),
                    summary.title,
                    game_id
                );
                cache::apply(
                    self.cache.as_ref(),
                    CatalogEvent::PriceSyncSucceeded { game_id },
                )
                .await;
                SyncOutcome::Succeeded
            }
            Err(e) => {
                error!("Could not store offers for game {}: {}", game_id, e);
                SyncOutcome::FailedRetryable
            }
        }
    }

    /// Consume the queue forever
    ///
    /// Recovers messages abandoned by a previous run, then loops on a
    /// blocking receive. The cooldown runs after a successful update but
    /// before the ack, so a crash mid-cooldown redelivers the message
    /// rather than losing it.
    pub async fn run(self, queue: PriceSyncQueue) {
        match queue.recover_pending().await {
            Ok(0) => {}
            Ok(n) => info!("Requeued {} message(s) from a previous run", n),
            Err(e) => error!("Queue recovery failed: {}", e),
        }

        info!("Price-sync consumer started");
        loop {
            let message = match queue.receive(RECEIVE_TIMEOUT_SECS).await {
                Ok(Some(message)) => message,
                Ok(None) => continue,
                Err(e) => {
                    error!("Queue receive failed: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };

            let outcome = self.process(&message).await;
            if outcome == SyncOutcome::Succeeded {
                tokio::time::sleep(self.cooldown).await;
            }

            if let Err(e) = queue.ack(&message).await {
                error!("Could not ack queue message '{}': {}", message, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::cache::keys;
    use crate::cache::store::memory::MemoryCache;
    use crate::games::models::{GameSummary, PriceOffer};
    use crate::games::repository::CatalogError;

    /// In-memory catalog holding titles and stored offers
    #[derive(Default)]
    struct FakeCatalog {
        titles: Mutex<HashMap<Uuid, String>>,
        offers: Mutex<HashMap<Uuid, Vec<PriceOffer>>>,
        fail_writes: Mutex<bool>,
    }

    impl FakeCatalog {
        fn with_game(self, id: Uuid, title: &str) -> Self {
            self.titles.lock().unwrap().insert(id, title.to_string());
            self
        }

        fn stored_offers(&self, id: Uuid) -> Vec<PriceOffer> {
            self.offers.lock().unwrap().get(&id).cloned().unwrap_or_default()
        }
    }

    #[axum::async_trait]
    impl GameCatalog for FakeCatalog {
        async fn find_summary(&self, game_id: Uuid) -> Result<Option<GameSummary>, CatalogError> {
            Ok(self
                .titles
                .lock()
                .unwrap()
                .get(&game_id)
                .map(|title| GameSummary {
                    id: game_id,
                    title: title.clone(),
                }))
        }

        async fn replace_offers(
            &self,
            game_id: Uuid,
            offers: &[PriceOffer],
        ) -> Result<(), CatalogError> {
            if *self.fail_writes.lock().unwrap() {
                return Err(CatalogError("write refused".to_string()));
            }
            self.offers.lock().unwrap().insert(game_id, offers.to_vec());
            Ok(())
        }

        async fn update_rating(
            &self,
            _game_id: Uuid,
            _rating: f64,
            _count: i32,
        ) -> Result<(), CatalogError> {
            Ok(())
        }

        async fn list_ids(&self) -> Result<Vec<Uuid>, CatalogError> {
            Ok(self.titles.lock().unwrap().keys().copied().collect())
        }
    }

    /// Offer source keyed by title
    #[derive(Default)]
    struct FakeSource {
        by_title: Mutex<HashMap<String, Vec<PriceOffer>>>,
    }

    impl FakeSource {
        fn with_offers(self, title: &str, offers: Vec<PriceOffer>) -> Self {
            self.by_title.lock().unwrap().insert(title.to_string(), offers);
            self
        }
    }

    #[axum::async_trait]
    impl OfferSource for FakeSource {
        async fn fetch_offers(&self, title: &str) -> Vec<PriceOffer> {
            self.by_title
                .lock()
                .unwrap()
                .get(title)
                .cloned()
                .unwrap_or_default()
        }
    }

    fn offer(store: &str, current: f64) -> PriceOffer {
        PriceOffer {
            store_name: store.to_string(),
            price_current: current,
            price_base: current,
            discount_percent: 0,
            shop_url: format!("https://{}.example", store),
        }
    }

    fn consumer(
        games: Arc<FakeCatalog>,
        provider: FakeSource,
        cache: Arc<MemoryCache>,
    ) -> PriceSyncConsumer<Arc<FakeCatalog>, FakeSource> {
        PriceSyncConsumer::new(games, provider, cache, Duration::ZERO)
    }

    #[tokio::test]
    async fn successful_sync_stores_offers_and_drops_the_detail_cache() {
        let game_id = Uuid::new_v4();
        let games = Arc::new(FakeCatalog::default().with_game(game_id, "Celeste"));
        let provider = FakeSource::default().with_offers("Celeste", vec![offer("steam", 9.99)]);
        let cache = Arc::new(MemoryCache::new());

        let detail_key = keys::game_detail_key(game_id);
        cache.put(&detail_key, "stale detail").await;
        cache.put(keys::TOP_RATED_KEY, "rankings").await;

        let consumer = consumer(games.clone(), provider, cache.clone());
        let outcome = consumer.process(&game_id.to_string()).await;

        assert_eq!(outcome, SyncOutcome::Succeeded);
        assert_eq!(games.stored_offers(game_id), vec![offer("steam", 9.99)]);
        // Only the detail entry is price-derived
        assert!(!cache.contains(&detail_key));
        assert!(cache.contains(keys::TOP_RATED_KEY));
    }

    #[tokio::test]
    async fn reprocessing_the_same_message_is_idempotent() {
        let game_id = Uuid::new_v4();
        let games = Arc::new(FakeCatalog::default().with_game(game_id, "Celeste"));
        let provider = FakeSource::default().with_offers("Celeste", vec![offer("steam", 9.99)]);
        let cache = Arc::new(MemoryCache::new());

        let consumer = consumer(games.clone(), provider, cache);
        let message = game_id.to_string();

        assert_eq!(consumer.process(&message).await, SyncOutcome::Succeeded);
        assert_eq!(consumer.process(&message).await, SyncOutcome::Succeeded);
        assert_eq!(games.stored_offers(game_id), vec![offer("steam", 9.99)]);
    }

    #[tokio::test]
    async fn empty_provider_result_keeps_stored_offers_and_cache() {
        let game_id = Uuid::new_v4();
        let games = Arc::new(FakeCatalog::default().with_game(game_id, "Obscure Game"));
        games
            .offers
            .lock()
            .unwrap()
            .insert(game_id, vec![offer("gog", 4.99)]);
        let cache = Arc::new(MemoryCache::new());
        let detail_key = keys::game_detail_key(game_id);
        cache.put(&detail_key, "detail").await;

        let consumer = consumer(games.clone(), FakeSource::default(), cache.clone());
        let outcome = consumer.process(&game_id.to_string()).await;

        assert_eq!(outcome, SyncOutcome::NoOffers);
        assert_eq!(games.stored_offers(game_id), vec![offer("gog", 4.99)]);
        assert!(cache.contains(&detail_key));
    }

    #[tokio::test]
    async fn missing_game_is_skipped_without_provider_damage() {
        let games = Arc::new(FakeCatalog::default());
        let consumer = consumer(games, FakeSource::default(), Arc::new(MemoryCache::new()));

        let outcome = consumer.process(&Uuid::new_v4().to_string()).await;
        assert_eq!(outcome, SyncOutcome::SkippedNotFound);
    }

    #[tokio::test]
    async fn malformed_message_is_discarded() {
        let games = Arc::new(FakeCatalog::default());
        let consumer = consumer(games, FakeSource::default(), Arc::new(MemoryCache::new()));

        let outcome = consumer.process("not-a-uuid").await;
        assert_eq!(outcome, SyncOutcome::SkippedNotFound);
    }

    #[tokio::test]
    async fn store_failure_is_retryable_and_leaves_the_cache_alone() {
        let game_id = Uuid::new_v4();
        let games = Arc::new(FakeCatalog::default().with_game(game_id, "Celeste"));
        *games.fail_writes.lock().unwrap() = true;
        let provider = FakeSource::default().with_offers("Celeste", vec![offer("steam", 9.99)]);
        let cache = Arc::new(MemoryCache::new());
        let detail_key = keys::game_detail_key(game_id);
        cache.put(&detail_key, "detail").await;

        let consumer = consumer(games.clone(), provider, cache.clone());
        let outcome = consumer.process(&game_id.to_string()).await;

        assert_eq!(outcome, SyncOutcome::FailedRetryable);
        assert!(games.stored_offers(game_id).is_empty());
        assert!(cache.contains(&detail_key));
    }

    #[tokio::test]
    async fn a_bad_message_does_not_stop_later_ones() {
        // Resilience across a batch: good, missing, good
        let g1 = Uuid::new_v4();
        let g2 = Uuid::new_v4();
        let games = Arc::new(
            FakeCatalog::default()
                .with_game(g1, "Celeste")
                .with_game(g2, "Hades"),
        );
        let provider = FakeSource::default()
            .with_offers("Celeste", vec![offer("steam", 9.99)])
            .with_offers("Hades", vec![offer("epic", 12.49)]);

        let consumer = consumer(games.clone(), provider, Arc::new(MemoryCache::new()));

        assert_eq!(consumer.process(&g1.to_string()).await, SyncOutcome::Succeeded);
        assert_eq!(
            consumer.process(&Uuid::new_v4().to_string()).await,
            SyncOutcome::SkippedNotFound
        );
        assert_eq!(consumer.process(&g2.to_string()).await, SyncOutcome::Succeeded);

        assert_eq!(games.stored_offers(g1), vec![offer("steam", 9.99)]);
        assert_eq!(games.stored_offers(g2), vec![offer("epic", 12.49)]);
    }
}
