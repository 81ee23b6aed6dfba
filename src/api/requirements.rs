use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ExportQuery};
use crate::api::validation::validate_requirement_id;
use crate::models::{BulkUpdateSummary, NewRequirement, RequirementPatch, RequirementRecord};
use crate::services::DateFilter;

/// `POST /api/require`
pub async fn create_requirement(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewRequirement>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RequirementRecord>>), ApiError> {
    let Json(input) = payload?;

    let record = state.requirement_service().create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "requirement Added Successfully",
            record,
        )),
    ))
}

/// `GET /api/require`
pub async fn list_requirements(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let records = state.requirement_service().list().await?;

    Ok(Json(ApiResponse::success(
        "requirement fetched successfully",
        records.as_slice(),
    ))
    .into_response())
}

/// `GET /api/require/{id}`
pub async fn get_requirement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RequirementRecord>>, ApiError> {
    let id = validate_requirement_id(&id)?;
    let record = state.requirement_service().get(id).await?;
    Ok(Json(ApiResponse::success(
        "requirement fetched successfully",
        record,
    )))
}

/// `PUT /api/require/{id}`
pub async fn update_requirement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<RequirementPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<RequirementRecord>>, ApiError> {
    let id = validate_requirement_id(&id)?;
    let Json(patch) = payload?;

    let record = state.requirement_service().update(id, patch).await?;
    Ok(Json(ApiResponse::success(
        "requirement updated successfully",
        record,
    )))
}

/// `PUT /api/require/requirement/updateAll`
pub async fn update_all_requirements(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RequirementPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<BulkUpdateSummary>>, ApiError> {
    let Json(patch) = payload?;

    let summary = state.requirement_service().update_all(patch).await?;
    Ok(Json(ApiResponse::success(
        "All Requirement updated successfully",
        summary,
    )))
}

/// `DELETE /api/require/{id}`
pub async fn delete_requirement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RequirementRecord>>, ApiError> {
    let id = validate_requirement_id(&id)?;
    let record = state.requirement_service().delete(id).await?;
    Ok(Json(ApiResponse::success("Deleted successfully", record)))
}

/// `GET /api/require/requirement/get-excel?filterBy=&year=&month=`
///
/// Streams the matching requirements as an `.xlsx` attachment.
pub async fn export_requirements(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;

    let filter = DateFilter::from_query(
        query.filter_by.as_deref(),
        query.year.as_deref(),
        query.month.as_deref(),
    )
    .map_err(ApiError::validation)?;

    let file = state.requirement_service().export(filter).await?;

    let disposition = format!("attachment; filename={}", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
