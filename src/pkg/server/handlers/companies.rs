use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            adaptors::companies::{
                mutators::CompanyMutator,
                selectors::CompanySelector,
                spec::{CompanyListFilter, CreateCompanyInput, PatchCompanyInput},
            },
            filters::Pagination,
        },
        server::{handlers::OneOrMany, state::AppState},
    },
    prelude::{Error, Result},
};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListParams {
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub company_name: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<OneOrMany<CreateCompanyInput>>,
) -> Result<impl IntoResponse> {
    let mutator = CompanyMutator::new(&state.db_pool);
    let data = match body {
        OneOrMany::One(input) => {
            input.validate()?;
            json!(mutator.create(input).await?)
        }
        OneOrMany::Many(inputs) => {
            for input in &inputs {
                input.validate()?;
            }
            json!(mutator.create_bulk(inputs).await?)
        }
    };
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Company data added successfully",
            "data": data,
        })),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CompanyListParams>,
) -> Result<impl IntoResponse> {
    let filter = CompanyListFilter {
        job_type: params.job_type.clone(),
        location: params.location.clone(),
        company_name: params.company_name.clone(),
    };
    let page = Pagination::from_params(params.page.as_deref(), params.limit.as_deref());
    let (companies, total) = CompanySelector::new(&state.db_pool).list(&filter, page).await?;
    Ok(Json(json!({
        "success": true,
        "count": companies.len(),
        "total": total,
        "page": page.page,
        "pages": page.pages(total),
        "data": companies,
    })))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let company = CompanySelector::new(&state.db_pool)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Company not found".to_string()))?;
    Ok(Json(json!({ "success": true, "data": company })))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<PatchCompanyInput>,
) -> Result<impl IntoResponse> {
    let company = CompanyMutator::new(&state.db_pool)
        .update(id, patch)
        .await?
        .ok_or_else(|| Error::NotFound("Company not found".to_string()))?;
    Ok(Json(json!({
        "success": true,
        "message": "Company updated successfully",
        "data": company,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    if !CompanyMutator::new(&state.db_pool).delete(id).await? {
        return Err(Error::NotFound("Company not found".to_string()));
    }
    Ok(Json(json!({
        "success": true,
        "message": "Company removed successfully",
    })))
}
