use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use shelfpulse_core::{AnalysisLimits, Category};
use shelfpulse_jobs::{render, CategoryReport, ExportView, JobError, JobSnapshot};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CreateJobRequest {
    pub category: String,
    pub max_products: Option<usize>,
    pub max_reviews: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct CleanupData {
    reaped: usize,
}

/// Validate a submission and turn it into pipeline inputs.
fn validate(req_id: &str, body: &CreateJobRequest) -> Result<(Category, AnalysisLimits), ApiError> {
    let category = Category::parse(&body.category)
        .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string()))?;
    let defaults = AnalysisLimits::default();
    let limits = AnalysisLimits::new(
        body.max_products.unwrap_or(defaults.max_products),
        body.max_reviews.unwrap_or(defaults.max_reviews),
    )
    .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string()))?;
    Ok((category, limits))
}

/// Unknown and malformed ids are the same "not found" condition.
fn parse_job_id(req_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::new(req_id, "not_found", format!("job {raw} not found")))
}

fn map_job_error(request_id: &str, error: &JobError) -> ApiError {
    match error {
        JobError::NotFound(_) => ApiError::new(request_id, "not_found", error.to_string()),
        JobError::NotReady { .. } | JobError::AlreadyFinished { .. } => {
            ApiError::new(request_id, "conflict", error.to_string())
        }
        _ => {
            tracing::error!(error = %error, "job operation failed");
            ApiError::new(request_id, "internal_error", "job operation failed")
        }
    }
}

pub(super) async fn create_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<ApiResponse<JobSnapshot>>), ApiError> {
    let (category, limits) = validate(&req_id.0, &body)?;
    let id = state.runner.submit(category, limits);
    let snapshot = state
        .runner
        .status(&id)
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "internal_error", "job vanished"))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: snapshot,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn list_jobs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<JobSnapshot>>> {
    let mut jobs: Vec<JobSnapshot> = state
        .runner
        .registry()
        .ids()
        .iter()
        .filter_map(|id| state.runner.status(id))
        .collect();
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Json(ApiResponse {
        data: jobs,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn get_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(job_id): Path<String>,
) -> Result<Json<ApiResponse<JobSnapshot>>, ApiError> {
    let id = parse_job_id(&req_id.0, &job_id)?;
    let snapshot = state
        .runner
        .status(&id)
        .ok_or_else(|| map_job_error(&req_id.0, &JobError::NotFound(id)))?;

    Ok(Json(ApiResponse {
        data: snapshot,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn cancel_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(job_id): Path<String>,
) -> Result<Json<ApiResponse<JobSnapshot>>, ApiError> {
    let id = parse_job_id(&req_id.0, &job_id)?;
    let snapshot = state
        .runner
        .cancel(&id)
        .map_err(|e| map_job_error(&req_id.0, &e))?;

    Ok(Json(ApiResponse {
        data: snapshot,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_job_result(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(job_id): Path<String>,
) -> Result<Json<ApiResponse<CategoryReport>>, ApiError> {
    let id = parse_job_id(&req_id.0, &job_id)?;
    let report = state
        .runner
        .result(&id)
        .map_err(|e| map_job_error(&req_id.0, &e))?;

    Ok(Json(ApiResponse {
        data: (*report).clone(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn export_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((job_id, view)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let id = parse_job_id(&req_id.0, &job_id)?;
    let view = ExportView::parse(&view).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "bad_request",
            format!("unknown export view '{view}'; expected summary, products or reviews"),
        )
    })?;
    let report = state
        .runner
        .result(&id)
        .map_err(|e| map_job_error(&req_id.0, &e))?;
    let body = render(view, &report).map_err(|e| {
        tracing::error!(job_id = %id, error = %e, "CSV render failed");
        ApiError::new(req_id.0.clone(), "internal_error", "export failed")
    })?;

    let disposition = format!(
        "attachment; filename=\"{}_{}.csv\"",
        file_stem(report.summary.category.as_str()),
        view
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub(super) async fn cleanup_jobs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<CleanupData>> {
    let reaped = state.runner.reap().await;
    Json(ApiResponse {
        data: CleanupData { reaped },
        meta: ResponseMeta::new(req_id.0),
    })
}

/// Category text made safe for a download file name.
fn file_stem(category: &str) -> String {
    category
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(category: &str, max_products: Option<usize>) -> CreateJobRequest {
        CreateJobRequest {
            category: category.to_string(),
            max_products,
            max_reviews: None,
        }
    }

    #[test]
    fn validate_applies_default_limits() {
        let (category, limits) = validate("req", &request(" cookies ", None)).unwrap();
        assert_eq!(category.as_str(), "cookies");
        assert_eq!(limits, AnalysisLimits::default());
    }

    #[test]
    fn validate_rejects_out_of_range_products() {
        let err = validate("req", &request("cookies", Some(21))).unwrap_err();
        assert_eq!(err.error.code, "validation_error");
        assert!(err.error.message.contains("max_products"));
    }

    #[test]
    fn file_stem_replaces_unsafe_characters() {
        assert_eq!(file_stem("ice cream/bars"), "ice_cream_bars");
    }
}
