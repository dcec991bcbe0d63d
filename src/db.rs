// Database connection pool setup

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Create the PostgreSQL connection pool shared by every repository
///
/// The pool is sized for one API process plus the background price-sync
/// worker; the short acquire timeout turns a saturated pool into a fast
/// 500 instead of a hung request.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created");
    Ok(pool)
}
