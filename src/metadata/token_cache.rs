// Cached client-credentials token for the metadata provider
//
// The token is shared by every metadata call, so it lives behind a cheap
// std mutex: the lock is only ever held to read or swap the cached entry,
// never across the network exchange.

use std::sync::Mutex;

use axum::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::metadata::error::MetadataError;

/// Tokens are treated as expired this long before the provider says so,
/// to absorb clock drift and in-flight request time
const EXPIRY_MARGIN_SECS: i64 = 300;

/// A freshly issued access token and its provider-reported lifetime
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
}

/// The credential exchange itself, separated out so the cache logic is
/// testable without a network
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(&self) -> Result<IssuedToken, MetadataError>;
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Token cache over any [`TokenExchanger`]
///
/// Two tasks that find the cache expired at the same time will both run
/// an exchange; the loser's token simply overwrites the winner's. That
/// redundant refresh is harmless and cheaper than serializing every
/// metadata call behind an async lock.
pub struct CatalogTokenCache<E> {
    exchanger: E,
    entry: Mutex<Option<CachedToken>>,
}

impl<E: TokenExchanger> CatalogTokenCache<E> {
    pub fn new(exchanger: E) -> Self {
        Self {
            exchanger,
            entry: Mutex::new(None),
        }
    }

    /// A token valid for at least the expiry margin, refreshed on demand
    pub async fn get_valid_token(&self) -> Result<String, MetadataError> {
        {
            let entry = self.entry.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = entry.as_ref() {
                if cached.expires_at > Utc::now() {
                    return Ok(cached.token.clone());
                }
            }
        }

        // Lock released: the exchange happens outside it
        let issued = self.exchanger.exchange().await?;
        let expires_at =
            Utc::now() + Duration::seconds((issued.expires_in - EXPIRY_MARGIN_SECS).max(0));
        debug!("Refreshed metadata access token, valid until {}", expires_at);

        let mut entry = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        *entry = Some(CachedToken {
            token: issued.access_token.clone(),
            expires_at,
        });

        Ok(issued.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Exchanger issuing numbered tokens and counting calls
    struct CountingExchanger {
        calls: AtomicUsize,
        expires_in: i64,
        fail: bool,
    }

    impl CountingExchanger {
        fn with_lifetime(expires_in: i64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                expires_in,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                expires_in: 3600,
                fail: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenExchanger for CountingExchanger {
        async fn exchange(&self) -> Result<IssuedToken, MetadataError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(MetadataError::Status {
                    endpoint: "oauth2/token",
                    status: reqwest::StatusCode::UNAUTHORIZED,
                });
            }
            Ok(IssuedToken {
                access_token: format!("token-{}", n),
                expires_in: self.expires_in,
            })
        }
    }

    #[tokio::test]
    async fn reuses_the_token_within_its_lifetime() {
        let cache = CatalogTokenCache::new(CountingExchanger::with_lifetime(3600));

        let first = cache.get_valid_token().await.unwrap();
        let second = cache.get_valid_token().await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(second, "token-1");
        assert_eq!(cache.exchanger.call_count(), 1);
    }

    #[tokio::test]
    async fn refreshes_when_the_margin_consumes_the_lifetime() {
        // expires_in equal to the margin leaves zero usable lifetime, so
        // the cached entry is expired the moment it is stored
        let cache = CatalogTokenCache::new(CountingExchanger::with_lifetime(EXPIRY_MARGIN_SECS));

        let first = cache.get_valid_token().await.unwrap();
        let second = cache.get_valid_token().await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(second, "token-2");
        assert_eq!(cache.exchanger.call_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_callers_both_get_a_token() {
        let cache = CatalogTokenCache::new(CountingExchanger::with_lifetime(3600));

        let (a, b) = tokio::join!(cache.get_valid_token(), cache.get_valid_token());

        assert!(a.is_ok());
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn exchange_failure_surfaces_and_caches_nothing() {
        let cache = CatalogTokenCache::new(CountingExchanger::failing());

        assert!(cache.get_valid_token().await.is_err());
        assert!(cache.get_valid_token().await.is_err());
        // Each call retried the exchange rather than caching the failure
        assert_eq!(cache.exchanger.call_count(), 2);
    }
}
