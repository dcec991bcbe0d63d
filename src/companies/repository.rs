use sqlx::PgPool;
use uuid::Uuid;

use crate::companies::models::Company;
use crate::error::ApiError;

/// Repository for database operations on companies
#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    /// Create a new CompanyRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new company
    pub async fn create(&self, name: &str, logo_url: Option<&str>) -> Result<Company, ApiError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, logo_url)
            VALUES ($1, $2)
            RETURNING id, name, logo_url, created_at
            "#,
        )
        .bind(name)
        .bind(logo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::Conflict {
                message: format!("Company '{}' already exists", name),
            },
            _ => ApiError::DatabaseError(e),
        })?;

        Ok(company)
    }

    /// Find a company by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, ApiError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, name, logo_url, created_at FROM companies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    /// All companies, alphabetical
    pub async fn find_all(&self) -> Result<Vec<Company>, ApiError> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT id, name, logo_url, created_at FROM companies ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(companies)
    }
}
