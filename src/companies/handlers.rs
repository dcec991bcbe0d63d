// HTTP handlers for company endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::middleware::AdminUser;
use crate::companies::models::{CompanyResponse, CreateCompanyRequest};
use crate::error::ApiError;
use crate::AppState;

/// Register a company (admin only)
/// POST /api/companies
#[utoipa::path(
    post,
    path = "/api/companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company registered", body = CompanyResponse),
        (status = 409, description = "Company name already taken"),
        (status = 403, description = "Actor is not an administrator"),
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
pub async fn create_company_handler(
    State(state): State<AppState>,
    AdminUser(_actor): AdminUser,
    Json(request): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    let company = state.companies.create_company(request).await?;
    Ok((StatusCode::CREATED, Json(company.into())))
}

/// Get a company by id
/// GET /api/companies/{id}
pub async fn get_company_handler(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let company = state.companies.get_company(company_id).await?;
    Ok(Json(company.into()))
}

/// List all companies
/// GET /api/companies
pub async fn list_companies_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<CompanyResponse>>, ApiError> {
    let companies = state.companies.list_companies().await?;
    Ok(Json(companies.into_iter().map(Into::into).collect()))
}
