use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::RequireAdmin;
use crate::features::issues::dtos::{
    CreateIssueDto, CreateIssueInput, IssueResponseDto, IssueStatsDto, ListIssuesQuery,
    UpdateIssueDto,
};
use crate::features::issues::models::{IssueCategory, IssueSeverity, IssueStatus, PhotoUpload};
use crate::features::issues::services::{export_filename, IssueService};
use crate::shared::types::{ApiResponse, Meta};

/// Report a new issue
///
/// Accepts multipart/form-data. `photo` is optional; files with an
/// unsupported extension are ignored.
#[utoipa::path(
    post,
    path = "/api/issues",
    tag = "issues",
    request_body(
        content = CreateIssueDto,
        content_type = "multipart/form-data",
        description = "Issue fields with an optional photo",
    ),
    responses(
        (status = 201, description = "Issue reported", body = ApiResponse<IssueResponseDto>),
        (status = 400, description = "Missing field, invalid category, severity or coordinate, or oversized upload"),
        (status = 500, description = "Photo storage failed")
    )
)]
pub async fn create_issue(
    State(service): State<Arc<IssueService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<IssueResponseDto>>)> {
    let mut input = CreateIssueInput::default();
    let mut photo: Option<PhotoUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "photo" {
            let file_name = field.file_name().unwrap_or("").to_string();
            let data = field.bytes().await.map_err(|e| {
                debug!("Failed to read photo bytes: {}", e);
                AppError::BadRequest(format!("Failed to read photo data: {}", e))
            })?;

            photo = Some(PhotoUpload {
                file_name,
                data: data.to_vec(),
            });
            continue;
        }

        let text = field.text().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read field '{}': {}", field_name, e))
        })?;

        if !input.set_field(&field_name, text) {
            debug!("Ignoring unknown field: {}", field_name);
        }
    }

    let issue = service.create(input, photo).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(issue),
            Some("Issue reported successfully".to_string()),
            None,
        )),
    ))
}

/// List issues, newest first
///
/// Filter values outside the allowed set are ignored.
#[utoipa::path(
    get,
    path = "/api/issues",
    tag = "issues",
    params(ListIssuesQuery),
    responses(
        (status = 200, description = "Matching issues", body = ApiResponse<Vec<IssueResponseDto>>)
    )
)]
pub async fn list_issues(
    State(service): State<Arc<IssueService>>,
    Query(query): Query<ListIssuesQuery>,
) -> Result<Json<ApiResponse<Vec<IssueResponseDto>>>> {
    let issues = service.list(query.into()).await?;
    let total = issues.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(issues),
        None,
        Some(Meta { total }),
    )))
}

/// Get an issue by id
#[utoipa::path(
    get,
    path = "/api/issues/{id}",
    tag = "issues",
    params(
        ("id" = i64, Path, description = "Issue id")
    ),
    responses(
        (status = 200, description = "Issue found", body = ApiResponse<IssueResponseDto>),
        (status = 404, description = "Issue not found")
    )
)]
pub async fn get_issue(
    State(service): State<Arc<IssueService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    let issue = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(issue), None, None)))
}

/// Update status, severity or admin notes (admin only)
///
/// Unknown status or severity values are ignored. `admin_notes: null`
/// clears the notes.
#[utoipa::path(
    put,
    path = "/api/issues/{id}",
    tag = "issues",
    params(
        ("id" = i64, Path, description = "Issue id")
    ),
    request_body = UpdateIssueDto,
    responses(
        (status = 200, description = "Issue updated", body = ApiResponse<IssueResponseDto>),
        (status = 400, description = "Malformed JSON"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Issue not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_issue(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<IssueService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateIssueDto>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    debug!("Admin '{}' updating issue {}", admin.username, id);

    let issue = service.update(id, dto.into()).await?;
    Ok(Json(ApiResponse::success(
        Some(issue),
        Some("Issue updated successfully".to_string()),
        None,
    )))
}

/// Delete an issue and its photo (admin only)
#[utoipa::path(
    delete,
    path = "/api/issues/{id}",
    tag = "issues",
    params(
        ("id" = i64, Path, description = "Issue id")
    ),
    responses(
        (status = 204, description = "Issue deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Issue not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_issue(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<IssueService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    debug!("Admin '{}' deleting issue {}", admin.username, id);

    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the photo attached to an issue
#[utoipa::path(
    get,
    path = "/api/issues/{id}/photo",
    tag = "issues",
    params(
        ("id" = i64, Path, description = "Issue id")
    ),
    responses(
        (status = 200, description = "Photo bytes with an image content type"),
        (status = 404, description = "Issue or photo not found")
    )
)]
pub async fn get_issue_photo(
    State(service): State<Arc<IssueService>>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let (bytes, content_type) = service.load_photo(id).await?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// Export every issue as CSV
#[utoipa::path(
    get,
    path = "/api/issues/export/csv",
    tag = "issues",
    responses(
        (status = 200, description = "CSV attachment named issues_export_<timestamp>.csv")
    )
)]
pub async fn export_issues_csv(State(service): State<Arc<IssueService>>) -> Result<Response> {
    let data = service.export_csv().await?;
    let disposition = format!("attachment; filename={}", export_filename(Utc::now()));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// Issue counts per status, category and severity
#[utoipa::path(
    get,
    path = "/api/issues/stats",
    tag = "issues",
    responses(
        (status = 200, description = "Issue statistics", body = ApiResponse<IssueStatsDto>)
    )
)]
pub async fn get_issue_stats(
    State(service): State<Arc<IssueService>>,
) -> Result<Json<ApiResponse<IssueStatsDto>>> {
    let stats = service.stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Allowed categories
#[utoipa::path(
    get,
    path = "/api/issues/categories",
    tag = "issues",
    responses(
        (status = 200, description = "Allowed categories", body = ApiResponse<Vec<IssueCategory>>)
    )
)]
pub async fn list_categories() -> Json<ApiResponse<Vec<IssueCategory>>> {
    Json(ApiResponse::success(
        Some(IssueCategory::all().to_vec()),
        None,
        None,
    ))
}

/// Allowed severities
#[utoipa::path(
    get,
    path = "/api/issues/severities",
    tag = "issues",
    responses(
        (status = 200, description = "Allowed severities", body = ApiResponse<Vec<IssueSeverity>>)
    )
)]
pub async fn list_severities() -> Json<ApiResponse<Vec<IssueSeverity>>> {
    Json(ApiResponse::success(
        Some(IssueSeverity::all().to_vec()),
        None,
        None,
    ))
}

/// Allowed statuses
#[utoipa::path(
    get,
    path = "/api/issues/statuses",
    tag = "issues",
    responses(
        (status = 200, description = "Allowed statuses", body = ApiResponse<Vec<IssueStatus>>)
    )
)]
pub async fn list_statuses() -> Json<ApiResponse<Vec<IssueStatus>>> {
    Json(ApiResponse::success(
        Some(IssueStatus::all().to_vec()),
        None,
        None,
    ))
}
