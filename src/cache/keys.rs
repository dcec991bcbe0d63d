// Key layout for the derived read caches
//
// Three named caches are kept coherent by explicit invalidation:
// per-game detail entries, the top-10-by-rating list and the
// top-10-by-release-date list. None of them carry a TTL; the only way an
// entry leaves the cache is an invalidation triggered by a write.

use uuid::Uuid;

/// Prefix under which every game-detail entry lives
pub const GAME_DETAIL_PREFIX: &str = "games:detail:";

/// Single key for the cached top-10-by-rating listing
pub const TOP_RATED_KEY: &str = "games:top10:rating";

/// Single key for the cached top-10-by-release-date listing
pub const NEWEST_RELEASES_KEY: &str = "games:top10:recent";

/// Cache key for one game's detail view
pub fn game_detail_key(game_id: Uuid) -> String {
    format!("{}{}", GAME_DETAIL_PREFIX, game_id)
}
