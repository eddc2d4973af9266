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
            adaptors::students::{
                mutators::StudentMutator,
                selectors::StudentSelector,
                spec::{CreateStudentInput, PatchStudentInput, StudentListFilter},
            },
            filters::{FilterSpec, Pagination, ReportParams, int_param},
            reports,
        },
        server::{handlers::OneOrMany, state::AppState},
    },
    prelude::{Error, Result},
};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudentListParams {
    pub sem: Option<String>,
    pub branch: Option<String>,
    pub course: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<OneOrMany<CreateStudentInput>>,
) -> Result<impl IntoResponse> {
    let mutator = StudentMutator::new(&state.db_pool);
    let data = match body {
        OneOrMany::One(input) => {
            let input = input.normalized();
            input.validate()?;
            json!(mutator.create(input).await?)
        }
        OneOrMany::Many(inputs) => {
            let inputs = inputs
                .into_iter()
                .map(|input| {
                    let input = input.normalized();
                    input.validate()?;
                    Ok(input)
                })
                .collect::<Result<Vec<_>>>()?;
            json!(mutator.create_bulk(inputs).await?)
        }
    };
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Student created successfully",
            "data": data,
        })),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<StudentListParams>,
) -> Result<impl IntoResponse> {
    let filter = StudentListFilter {
        sem: params.sem.as_deref().map(int_param),
        branch: params.branch.clone(),
        course: params.course.clone(),
    };
    let page = Pagination::from_params(params.page.as_deref(), params.limit.as_deref());
    let (students, total) = StudentSelector::new(&state.db_pool).list(&filter, page).await?;
    Ok(Json(json!({
        "success": true,
        "count": students.len(),
        "total": total,
        "page": page.page,
        "pages": page.pages(total),
        "data": students,
    })))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let student = StudentSelector::new(&state.db_pool)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Student not found".to_string()))?;
    Ok(Json(json!({ "success": true, "data": student })))
}

pub async fn get_by_usn(
    State(state): State<AppState>,
    Path(usn): Path<String>,
) -> Result<impl IntoResponse> {
    let student = StudentSelector::new(&state.db_pool)
        .get_by_usn(&usn)
        .await?
        .ok_or_else(|| Error::NotFound("Student not found".to_string()))?;
    Ok(Json(json!({ "success": true, "data": student })))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<PatchStudentInput>,
) -> Result<impl IntoResponse> {
    let patch = patch.normalized();
    patch.validate()?;
    let student = StudentMutator::new(&state.db_pool)
        .update(id, patch)
        .await?
        .ok_or_else(|| Error::NotFound("Student not found".to_string()))?;
    Ok(Json(json!({
        "success": true,
        "message": "Student updated successfully",
        "data": student,
    })))
}

/// Applies one patch to every student record.
pub async fn bulk_update(
    State(state): State<AppState>,
    Json(patch): Json<PatchStudentInput>,
) -> Result<impl IntoResponse> {
    let patch = patch.normalized();
    patch.validate()?;
    if patch.is_empty() {
        return Err(Error::Validation("No fields to update".to_string()));
    }
    let modified = StudentMutator::new(&state.db_pool).update_all(patch).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Students updated successfully",
        "modified": modified,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    if !StudentMutator::new(&state.db_pool).delete(id).await? {
        return Err(Error::NotFound("Student not found".to_string()));
    }
    Ok(Json(json!({
        "success": true,
        "message": "Student deleted successfully",
    })))
}

pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse> {
    let spec = FilterSpec::from_params(&params);
    let stats = reports::dashboard_stats(&state.db_pool, &spec).await?;
    Ok(Json(json!({ "success": true, "data": stats })))
}

pub async fn company_selections(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse> {
    let spec = FilterSpec::from_params(&params);
    let selections = reports::company_selections(&state.db_pool, &spec).await?;
    Ok(Json(json!({ "success": true, "data": selections })))
}

pub async fn status_distribution(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse> {
    let spec = FilterSpec::from_params(&params);
    let distribution = reports::status_distribution(&state.db_pool, &spec).await?;
    Ok(Json(json!({ "success": true, "data": distribution })))
}
