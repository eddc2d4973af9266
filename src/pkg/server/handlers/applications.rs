use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    pkg::{
        internal::{
            adaptors::applications::{
                mutators::ApplicationMutator,
                selectors::ApplicationSelector,
                spec::{CreateApplicationInput, PatchApplicationInput},
            },
            filters::{FilterSpec, Pagination, ReportParams},
            reports,
        },
        server::{handlers::OneOrMany, state::AppState},
    },
    prelude::{Error, Result},
};

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<OneOrMany<CreateApplicationInput>>,
) -> Result<impl IntoResponse> {
    let mutator = ApplicationMutator::new(&state.db_pool);
    let data = match body {
        OneOrMany::One(input) => json!(mutator.create(input).await?),
        OneOrMany::Many(inputs) => json!(mutator.create_bulk(inputs).await?),
    };
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Application submitted",
            "data": data,
        })),
    ))
}

/// Filtered, joined, paginated listing over the reporting pipeline.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse> {
    let spec = FilterSpec::from_params(&params);
    let page = Pagination::from_params(params.page.as_deref(), params.limit.as_deref());
    let (applications, total) = reports::fetch_page(&state.db_pool, &spec, page).await?;
    Ok(Json(json!({
        "success": true,
        "count": applications.len(),
        "total": total,
        "page": page.page,
        "pages": page.pages(total),
        "data": applications,
    })))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let application = ApplicationSelector::new(&state.db_pool)
        .get_detail(id)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
    Ok(Json(json!({ "success": true, "data": application })))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<PatchApplicationInput>,
) -> Result<impl IntoResponse> {
    let application = ApplicationMutator::new(&state.db_pool)
        .update(id, patch)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
    Ok(Json(json!({
        "success": true,
        "message": "Application updated",
        "data": application,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    if !ApplicationMutator::new(&state.db_pool).delete(id).await? {
        return Err(Error::NotFound("Application not found".to_string()));
    }
    Ok(Json(json!({
        "success": true,
        "message": "Application removed",
    })))
}
