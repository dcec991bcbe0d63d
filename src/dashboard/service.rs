use crate::dashboard::models::DashboardStats;
use crate::dashboard::repository::DashboardRepository;
use crate::error::ApiError;

/// Service layer for the admin dashboard
#[derive(Clone)]
pub struct DashboardService {
    repository: DashboardRepository,
}

impl DashboardService {
    /// Create a new DashboardService
    pub fn new(repository: DashboardRepository) -> Self {
        Self { repository }
    }

    /// Current catalog-wide statistics
    pub async fn overview(&self) -> Result<DashboardStats, ApiError> {
        self.repository.collect().await
    }
}
