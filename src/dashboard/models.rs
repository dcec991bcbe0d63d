use serde::Serialize;
use utoipa::ToSchema;

/// Catalog-wide statistics for the admin dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_games: i64,
    pub total_reviews: i64,
    pub total_companies: i64,
    /// Mean of every review rating in the catalog, one decimal; 0.0 when
    /// there are no reviews yet
    pub overall_mean_rating: f64,
}
