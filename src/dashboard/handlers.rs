// HTTP handlers for the admin dashboard

use axum::{extract::State, Json};

use crate::auth::middleware::AdminUser;
use crate::dashboard::models::DashboardStats;
use crate::error::ApiError;
use crate::AppState;

/// Catalog-wide statistics (admin only)
/// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Catalog statistics", body = DashboardStats),
        (status = 403, description = "Actor is not an administrator"),
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn dashboard_handler(
    State(state): State<AppState>,
    AdminUser(_actor): AdminUser,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.dashboard.overview().await?))
}
