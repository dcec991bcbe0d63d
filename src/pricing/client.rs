// IsThereAnyDeal pricing client
//
// A game title is not a stable key on the provider side, so every fetch
// is two-phase: resolve the title to the provider's canonical id, then
// fetch the current deals for that id. Both calls are keyed by an API
// credential passed as a query parameter.

use axum::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::games::models::PriceOffer;
use crate::pricing::error::PricingError;

/// The two provider calls, separated out so the orchestration (and its
/// short-circuit on a failed resolve) is testable without a network.
#[async_trait]
pub trait PricingApi: Send + Sync {
    /// Resolve a title to the provider's canonical game id
    async fn lookup_game_id(&self, title: &str) -> Result<Option<String>, PricingError>;

    /// Current deals for a canonical id
    async fn fetch_deals(&self, game_id: &str) -> Result<Vec<DealEntry>, PricingError>;
}

/// Anything the price-sync consumer can pull offers from
#[async_trait]
pub trait OfferSource: Send + Sync {
    /// Offers for a title; empty on resolve failure, on zero current
    /// deals and on any provider error. Never fails.
    async fn fetch_offers(&self, title: &str) -> Vec<PriceOffer>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    found: bool,
    game: Option<LookupGame>,
}

#[derive(Debug, Deserialize)]
struct LookupGame {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PriceResult {
    #[serde(default)]
    deals: Vec<DealEntry>,
}

/// One store's deal as returned by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct DealEntry {
    pub shop: DealShop,
    pub price: Option<DealAmount>,
    pub regular: Option<DealAmount>,
    #[serde(default)]
    pub cut: i32,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DealShop {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DealAmount {
    pub amount: f64,
}

/// HTTP client for the IsThereAnyDeal API
#[derive(Clone)]
pub struct ItadClient {
    http: Client,
    base_url: String,
    api_key: String,
    country: String,
}

impl ItadClient {
    /// Build the client from configuration; the HTTP timeout bounds both
    /// provider calls
    pub fn new(config: &Config) -> Result<Self, PricingError> {
        let http = Client::builder().timeout(config.http_timeout).build()?;

        Ok(Self {
            http,
            base_url: config.itad_base_url.trim_end_matches('/').to_string(),
            api_key: config.itad_api_key.clone(),
            country: config.itad_country.clone(),
        })
    }
}

#[async_trait]
impl PricingApi for ItadClient {
    async fn lookup_game_id(&self, title: &str) -> Result<Option<String>, PricingError> {
        let url = format!("{}/games/lookup/v1", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("title", title)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PricingError::Status {
                endpoint: "games/lookup/v1",
                status,
            });
        }

        let lookup: LookupResponse = response.json().await?;
        if !lookup.found {
            return Ok(None);
        }

        Ok(lookup.game.map(|game| game.id))
    }

    async fn fetch_deals(&self, game_id: &str) -> Result<Vec<DealEntry>, PricingError> {
        let url = format!("{}/games/prices/v3", self.base_url);
        // The endpoint only takes a batch of ids; we always send one
        let response = self
            .http
            .post(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("country", self.country.as_str()),
            ])
            .json(&[game_id])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PricingError::Status {
                endpoint: "games/prices/v3",
                status,
            });
        }

        let mut results: Vec<PriceResult> = response.json().await?;
        let deals = results
            .drain(..)
            .next()
            .map(|result| result.deals)
            .unwrap_or_default();
        Ok(deals)
    }
}

#[async_trait]
impl OfferSource for ItadClient {
    async fn fetch_offers(&self, title: &str) -> Vec<PriceOffer> {
        fetch_offers_with(self, title).await
    }
}

/// Two-phase offer fetch over any [`PricingApi`]
///
/// Resolve failures, zero-deal results and provider errors all collapse
/// to an empty list; a resolve miss never triggers the second call.
pub async fn fetch_offers_with<A: PricingApi + ?Sized>(api: &A, title: &str) -> Vec<PriceOffer> {
    let game_id = match api.lookup_game_id(title).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            warn!("No canonical id found for title '{}'", title);
            return Vec::new();
        }
        Err(e) => {
            error!("Price lookup failed for '{}': {}", title, e);
            return Vec::new();
        }
    };
    info!("Resolved '{}' to canonical id {}", title, game_id);

    match api.fetch_deals(&game_id).await {
        Ok(deals) => deals.into_iter().map(offer_from_deal).collect(),
        Err(e) => {
            error!("Price fetch failed for id '{}': {}", game_id, e);
            Vec::new()
        }
    }
}

/// Convert a provider deal into a catalog offer
///
/// A missing current price is recorded as 0.0; a missing regular price
/// falls back to the current one.
fn offer_from_deal(deal: DealEntry) -> PriceOffer {
    let price_current = deal.price.map(|p| p.amount).unwrap_or(0.0);
    let price_base = deal.regular.map(|p| p.amount).unwrap_or(price_current);

    PriceOffer {
        store_name: deal.shop.name,
        price_current,
        price_base,
        discount_percent: deal.cut,
        shop_url: deal.url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scriptable provider fake counting calls to each phase
    struct FakeApi {
        lookup: Result<Option<String>, ()>,
        deals: Vec<DealEntry>,
        deals_fail: bool,
        deals_calls: AtomicUsize,
    }

    impl FakeApi {
        fn resolving_to(id: &str, deals: Vec<DealEntry>) -> Self {
            Self {
                lookup: Ok(Some(id.to_string())),
                deals,
                deals_fail: false,
                deals_calls: AtomicUsize::new(0),
            }
        }

        fn unresolved() -> Self {
            Self {
                lookup: Ok(None),
                deals: Vec::new(),
                deals_fail: false,
                deals_calls: AtomicUsize::new(0),
            }
        }

        fn lookup_failing() -> Self {
            Self {
                lookup: Err(()),
                deals: Vec::new(),
                deals_fail: false,
                deals_calls: AtomicUsize::new(0),
            }
        }
    }

    fn status_error() -> PricingError {
        PricingError::Status {
            endpoint: "games/lookup/v1",
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[async_trait]
    impl PricingApi for FakeApi {
        async fn lookup_game_id(&self, _title: &str) -> Result<Option<String>, PricingError> {
            self.lookup.clone().map_err(|_| status_error())
        }

        async fn fetch_deals(&self, _game_id: &str) -> Result<Vec<DealEntry>, PricingError> {
            self.deals_calls.fetch_add(1, Ordering::SeqCst);
            if self.deals_fail {
                return Err(status_error());
            }
            Ok(self.deals.clone())
        }
    }

    fn deal(store: &str, price: Option<f64>, regular: Option<f64>, cut: i32) -> DealEntry {
        DealEntry {
            shop: DealShop {
                name: store.to_string(),
            },
            price: price.map(|amount| DealAmount { amount }),
            regular: regular.map(|amount| DealAmount { amount }),
            cut,
            url: format!("https://{}.example/deal", store),
        }
    }

    #[tokio::test]
    async fn maps_deals_to_offers() {
        let api = FakeApi::resolving_to(
            "018d-xyz",
            vec![deal("steam", Some(29.99), Some(59.99), 50)],
        );

        let offers = fetch_offers_with(&api, "Hollow Knight").await;

        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].store_name, "steam");
        assert_eq!(offers[0].price_current, 29.99);
        assert_eq!(offers[0].price_base, 59.99);
        assert_eq!(offers[0].discount_percent, 50);
    }

    #[tokio::test]
    async fn unresolved_title_short_circuits_price_fetch() {
        let api = FakeApi::unresolved();

        let offers = fetch_offers_with(&api, "Unknown Game").await;

        assert!(offers.is_empty());
        // The second phase must never run after a failed resolve
        assert_eq!(api.deals_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lookup_error_degrades_to_empty_list() {
        let api = FakeApi::lookup_failing();

        let offers = fetch_offers_with(&api, "Any Game").await;

        assert!(offers.is_empty());
        assert_eq!(api.deals_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn deals_error_degrades_to_empty_list() {
        let mut api = FakeApi::resolving_to("018d-xyz", Vec::new());
        api.deals_fail = true;

        let offers = fetch_offers_with(&api, "Any Game").await;
        assert!(offers.is_empty());
    }

    #[tokio::test]
    async fn resolved_game_with_no_deals_is_a_valid_empty_result() {
        // The game exists on the provider but has no current offers;
        // distinct cause from a failed resolve, same empty list out.
        let api = FakeApi::resolving_to("018d-xyz", Vec::new());

        let offers = fetch_offers_with(&api, "Obscure Game").await;

        assert!(offers.is_empty());
        assert_eq!(api.deals_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_amounts_fall_back() {
        let offer = offer_from_deal(deal("gog", None, None, 0));
        assert_eq!(offer.price_current, 0.0);
        assert_eq!(offer.price_base, 0.0);

        let offer = offer_from_deal(deal("gog", Some(12.5), None, 0));
        assert_eq!(offer.price_base, 12.5);
    }
}
