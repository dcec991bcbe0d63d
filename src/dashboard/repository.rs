use sqlx::PgPool;

use crate::dashboard::models::DashboardStats;
use crate::error::ApiError;

/// Repository for catalog-wide statistics
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    /// Create a new DashboardRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Collect every dashboard figure in a single round trip
    pub async fn collect(&self) -> Result<DashboardStats, ApiError> {
        let (total_games, total_reviews, total_companies, mean_rating): (
            i64,
            i64,
            i64,
            Option<f64>,
        ) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM games),
                (SELECT COUNT(*) FROM reviews),
                (SELECT COUNT(*) FROM companies),
                (SELECT AVG(rating::float8) FROM reviews)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_games,
            total_reviews,
            total_companies,
            overall_mean_rating: round_mean(mean_rating),
        })
    }
}

/// AVG is NULL with zero reviews; report 0.0 and round to one decimal
/// like the per-game aggregates
fn round_mean(mean: Option<f64>) -> f64 {
    match mean {
        Some(mean) => (mean * 10.0).round() / 10.0,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reviews_reports_a_zero_mean() {
        assert_eq!(round_mean(None), 0.0);
    }

    #[test]
    fn mean_is_rounded_to_one_decimal() {
        assert_eq!(round_mean(Some(26.0 / 3.0)), 8.7);
        assert_eq!(round_mean(Some(8.25)), 8.3);
    }
}
