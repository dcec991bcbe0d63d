// Aggregate-rating recomputation
//
// Every review mutation triggers a full recompute of the game's mean
// rating and review count from the review store. Incremental updates
// (adding/subtracting deltas) would drift the moment an event is missed,
// so the recompute always starts from the store's own aggregation.

use tracing::{debug, error};
use uuid::Uuid;

use crate::games::repository::{CatalogError, GameCatalog};
use crate::reviews::models::AggregationResult;
use crate::reviews::repository::ReviewAggregates;

/// Recomputes and persists a game's aggregate rating
#[derive(Clone)]
pub struct RatingAggregator<R, G> {
    reviews: R,
    games: G,
}

impl<R, G> RatingAggregator<R, G>
where
    R: ReviewAggregates,
    G: GameCatalog,
{
    /// Create a new RatingAggregator
    pub fn new(reviews: R, games: G) -> Self {
        Self { reviews, games }
    }

    /// Recompute the game's mean rating and review count and write them
    /// back onto the game record
    ///
    /// Zero remaining reviews resets the fields to 0.0 / 0. If the
    /// aggregation query itself fails the game's fields are left exactly
    /// as they were; stale is recoverable, a bogus zero is not.
    pub async fn recompute(&self, game_id: Uuid) -> Result<(), CatalogError> {
        let aggregate = match self.reviews.aggregate_for_game(game_id).await {
            Ok(aggregate) => aggregate,
            Err(e) => {
                error!("Rating aggregation failed for game {}: {}", game_id, e);
                return Err(e);
            }
        };

        let (rating, count) = resolve_aggregate(aggregate);
        debug!(
            "Recomputed rating for game {}: {} across {} reviews",
            game_id, rating, count
        );

        self.games.update_rating(game_id, rating, count).await
    }
}

/// Turn the aggregation-query result into the fields stored on the game
fn resolve_aggregate(aggregate: Option<AggregationResult>) -> (f64, i32) {
    match aggregate {
        Some(result) => (
            round_to_one_decimal(result.mean_rating),
            // The stored column is i32; saturate rather than wrap if the
            // count ever outgrows it
            i32::try_from(result.review_count).unwrap_or(i32::MAX),
        ),
        None => (0.0, 0),
    }
}

/// Round half up to one decimal place
fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::async_trait;
    use proptest::prelude::*;
    use std::sync::Mutex;

    use crate::games::models::{GameSummary, PriceOffer};

    /// Review store fake computing the aggregate from an in-memory list
    struct FakeReviews {
        ratings: Mutex<Vec<i16>>,
        fail: bool,
    }

    impl FakeReviews {
        fn with(ratings: Vec<i16>) -> Self {
            Self {
                ratings: Mutex::new(ratings),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                ratings: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn push(&self, rating: i16) {
            self.ratings.lock().unwrap().push(rating);
        }

        fn remove(&self, rating: i16) {
            let mut ratings = self.ratings.lock().unwrap();
            if let Some(pos) = ratings.iter().position(|&r| r == rating) {
                ratings.remove(pos);
            }
        }
    }

    #[async_trait]
    impl ReviewAggregates for FakeReviews {
        async fn aggregate_for_game(
            &self,
            game_id: Uuid,
        ) -> Result<Option<AggregationResult>, CatalogError> {
            if self.fail {
                return Err(CatalogError("malformed aggregation".to_string()));
            }
            let ratings = self.ratings.lock().unwrap();
            if ratings.is_empty() {
                return Ok(None);
            }
            let sum: i64 = ratings.iter().map(|&r| r as i64).sum();
            Ok(Some(AggregationResult {
                game_id,
                mean_rating: sum as f64 / ratings.len() as f64,
                review_count: ratings.len() as i64,
            }))
        }
    }

    /// Catalog fake that records the last persisted rating
    #[derive(Default)]
    struct FakeCatalog {
        stored: Mutex<Option<(f64, i32)>>,
    }

    #[async_trait]
    impl GameCatalog for FakeCatalog {
        async fn find_summary(&self, _: Uuid) -> Result<Option<GameSummary>, CatalogError> {
            Ok(None)
        }

        async fn replace_offers(&self, _: Uuid, _: &[PriceOffer]) -> Result<(), CatalogError> {
            Ok(())
        }

        async fn update_rating(
            &self,
            _game_id: Uuid,
            rating: f64,
            count: i32,
        ) -> Result<(), CatalogError> {
            *self.stored.lock().unwrap() = Some((rating, count));
            Ok(())
        }

        async fn list_ids(&self) -> Result<Vec<Uuid>, CatalogError> {
            Ok(Vec::new())
        }
    }

    fn aggregator(
        reviews: FakeReviews,
    ) -> RatingAggregator<FakeReviews, std::sync::Arc<FakeCatalog>> {
        RatingAggregator::new(reviews, std::sync::Arc::new(FakeCatalog::default()))
    }

    #[tokio::test]
    async fn scenario_from_nine_eight_ten_through_edits() {
        let game_id = Uuid::new_v4();
        let catalog = std::sync::Arc::new(FakeCatalog::default());
        let reviews = FakeReviews::with(vec![9, 8, 10]);
        let aggregator = RatingAggregator::new(reviews, catalog.clone());

        aggregator.recompute(game_id).await.unwrap();
        assert_eq!(*catalog.stored.lock().unwrap(), Some((9.0, 3)));

        aggregator.reviews.push(7);
        aggregator.recompute(game_id).await.unwrap();
        assert_eq!(*catalog.stored.lock().unwrap(), Some((8.5, 4)));

        aggregator.reviews.remove(10);
        aggregator.recompute(game_id).await.unwrap();
        assert_eq!(*catalog.stored.lock().unwrap(), Some((8.0, 3)));
    }

    #[tokio::test]
    async fn zero_reviews_resets_to_defaults() {
        let aggregator = aggregator(FakeReviews::with(vec![]));
        let catalog = aggregator.games.clone();

        aggregator.recompute(Uuid::new_v4()).await.unwrap();
        assert_eq!(*catalog.stored.lock().unwrap(), Some((0.0, 0)));
    }

    #[tokio::test]
    async fn aggregation_failure_leaves_rating_untouched() {
        let aggregator = aggregator(FakeReviews::failing());
        let catalog = aggregator.games.clone();

        let result = aggregator.recompute(Uuid::new_v4()).await;

        assert!(result.is_err());
        assert_eq!(*catalog.stored.lock().unwrap(), None);
    }

    #[test]
    fn rounds_half_up_to_one_decimal() {
        assert_eq!(round_to_one_decimal(8.25), 8.3);
        assert_eq!(round_to_one_decimal(8.24), 8.2);
        assert_eq!(round_to_one_decimal(17.0 / 2.0), 8.5);
        assert_eq!(round_to_one_decimal(26.0 / 3.0), 8.7);
    }

    #[test]
    fn resolve_none_is_zeroes() {
        assert_eq!(resolve_aggregate(None), (0.0, 0));
    }

    #[test]
    fn oversized_review_count_saturates_instead_of_wrapping() {
        let aggregate = Some(AggregationResult {
            game_id: Uuid::new_v4(),
            mean_rating: 7.5,
            review_count: i64::from(i32::MAX) + 1,
        });
        assert_eq!(resolve_aggregate(aggregate), (7.5, i32::MAX));
    }

    proptest! {
        /// The stored rating is always the rounded mean, on a tenth-step
        /// grid inside the rating scale.
        #[test]
        fn rounded_mean_stays_on_scale(ratings in proptest::collection::vec(0i16..=10, 1..50)) {
            let sum: i64 = ratings.iter().map(|&r| r as i64).sum();
            let mean = sum as f64 / ratings.len() as f64;
            let rounded = round_to_one_decimal(mean);

            prop_assert!((0.0..=10.0).contains(&rounded));
            prop_assert!((rounded - mean).abs() <= 0.05 + f64::EPSILON * 100.0);
            let tenths = rounded * 10.0;
            prop_assert!((tenths - tenths.round()).abs() < 1e-9);
        }
    }
}
