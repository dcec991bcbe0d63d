// Derived cache store over Redis
//
// The cache is best-effort: a Redis hiccup must never fail the request
// that was reading or writing through it, so every operation swallows and
// logs its own errors instead of returning them.

use axum::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, warn};

/// Key/value store backing the derived read caches
///
/// Implementations must treat failures as cache misses (get) or no-ops
/// (put/invalidate) so the cache can never take the catalog down with it.
#[async_trait]
pub trait DerivedCache: Send + Sync {
    /// Fetch a cached value, `None` on miss or error
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a value with no expiry
    async fn put(&self, key: &str, value: &str);

    /// Drop a single entry
    async fn invalidate(&self, key: &str);

    /// Drop every entry under a key prefix
    async fn invalidate_prefix(&self, prefix: &str);
}

/// Redis-backed implementation of [`DerivedCache`]
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl DerivedCache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Cache read failed for key '{}': {}", key, e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &str) {
        let mut conn = self.conn.clone();
        if let Err(e) = conn.set::<_, _, ()>(key, value).await {
            warn!("Cache write failed for key '{}': {}", key, e);
        }
    }

    async fn invalidate(&self, key: &str) {
        let mut conn = self.conn.clone();
        match conn.del::<_, i64>(key).await {
            Ok(removed) => debug!("Invalidated cache key '{}' (removed: {})", key, removed),
            Err(e) => warn!("Cache invalidation failed for key '{}': {}", key, e),
        }
    }

    async fn invalidate_prefix(&self, prefix: &str) {
        let pattern = format!("{}*", prefix);
        let mut scan_conn = self.conn.clone();

        // Collect first, then delete: SCAN holds the connection mutably
        let keys: Vec<String> = {
            let mut iter = match scan_conn.scan_match::<_, String>(&pattern).await {
                Ok(iter) => iter,
                Err(e) => {
                    warn!("Cache scan failed for pattern '{}': {}", pattern, e);
                    return;
                }
            };

            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        if keys.is_empty() {
            return;
        }

        let mut conn = self.conn.clone();
        match conn.del::<_, i64>(keys.clone()).await {
            Ok(removed) => debug!(
                "Invalidated {} cache entries under prefix '{}'",
                removed, prefix
            ),
            Err(e) => warn!("Cache invalidation failed for prefix '{}': {}", prefix, e),
        }
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory [`DerivedCache`] used by the unit tests

    use super::DerivedCache;
    use axum::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryCache {
        entries: Mutex<HashMap<String, String>>,
    }

    impl MemoryCache {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn contains(&self, key: &str) -> bool {
            self.entries
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .contains_key(key)
        }
    }

    #[async_trait]
    impl DerivedCache for MemoryCache {
        async fn get(&self, key: &str) -> Option<String> {
            self.entries
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .get(key)
                .cloned()
        }

        async fn put(&self, key: &str, value: &str) {
            self.entries
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(key.to_string(), value.to_string());
        }

        async fn invalidate(&self, key: &str) {
            self.entries
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(key);
        }

        async fn invalidate_prefix(&self, prefix: &str) {
            self.entries
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .retain(|key, _| !key.starts_with(prefix));
        }
    }
}
