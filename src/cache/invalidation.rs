// Declarative invalidation rules for the derived read caches
//
// Every operation that can change a game's displayed price, rating or
// list membership maps to the exact set of cache keys it must drop. The
// mapping is a pure function so each mutating operation's obligation can
// be unit-tested directly.

use uuid::Uuid;

use crate::cache::keys::{game_detail_key, NEWEST_RELEASES_KEY, TOP_RATED_KEY};
use crate::cache::store::DerivedCache;

/// A catalog mutation that derived caches must react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEvent {
    /// A game was created (it may enter either top-10 list)
    GameCreated,
    /// A game's fields or genres changed
    GameUpdated { game_id: Uuid },
    /// A game was removed from the catalog
    GameDeleted { game_id: Uuid },
    /// A price sync replaced the game's offer list
    PriceSyncSucceeded { game_id: Uuid },
    /// A review for the game was created, edited or deleted
    ReviewChanged { game_id: Uuid },
}

/// The cache keys a given event invalidates
pub fn affected_keys(event: CatalogEvent) -> Vec<String> {
    match event {
        CatalogEvent::GameCreated => vec![
            TOP_RATED_KEY.to_string(),
            NEWEST_RELEASES_KEY.to_string(),
        ],
        CatalogEvent::GameUpdated { game_id } | CatalogEvent::GameDeleted { game_id } => vec![
            game_detail_key(game_id),
            TOP_RATED_KEY.to_string(),
            NEWEST_RELEASES_KEY.to_string(),
        ],
        CatalogEvent::PriceSyncSucceeded { game_id } => vec![game_detail_key(game_id)],
        CatalogEvent::ReviewChanged { game_id } => {
            vec![game_detail_key(game_id), TOP_RATED_KEY.to_string()]
        }
    }
}

/// Apply an event's invalidations to the cache
pub async fn apply<C: DerivedCache + ?Sized>(cache: &C, event: CatalogEvent) {
    for key in affected_keys(event) {
        cache.invalidate(&key).await;
    }
}
