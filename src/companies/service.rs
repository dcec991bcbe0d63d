use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::companies::models::{Company, CreateCompanyRequest};
use crate::companies::repository::CompanyRepository;
use crate::error::ApiError;
use crate::metadata::IgdbClient;

/// Service layer for company business logic
#[derive(Clone)]
pub struct CompanyService {
    repository: CompanyRepository,
    metadata: Arc<IgdbClient>,
}

impl CompanyService {
    /// Create a new CompanyService
    pub fn new(repository: CompanyRepository, metadata: Arc<IgdbClient>) -> Self {
        Self {
            repository,
            metadata,
        }
    }

    /// Register a company, enriching it with a logo from the metadata
    /// provider when one can be found
    pub async fn create_company(&self, request: CreateCompanyRequest) -> Result<Company, ApiError> {
        request.validate()?;

        let logo_url = self.metadata.find_company_logo(&request.name).await;
        if logo_url.is_none() {
            info!("No logo found for company '{}'", request.name);
        }

        let company = self
            .repository
            .create(&request.name, logo_url.as_deref())
            .await?;
        info!("Company '{}' registered as {}", company.name, company.id);

        Ok(company)
    }

    /// Company by id
    pub async fn get_company(&self, id: Uuid) -> Result<Company, ApiError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: "Company".to_string(),
                id: id.to_string(),
            })
    }

    /// All companies, alphabetical
    pub async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        self.repository.find_all().await
    }
}
