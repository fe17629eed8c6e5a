//! Report endpoints

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{ReportEnvelope, ReportKind};

use crate::config::MAX_LATEST_REPORTS;
use crate::reports::{self, GenerateReportRequest};
use crate::state::AppState;

const GENERATE_FAILED: &str = "Failed to generate reports";
const FETCH_FAILED: &str = "Failed to fetch reports";

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateReportResponse {
    pub message: String,
    pub report: ReportEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct LatestParams {
    pub limit: Option<usize>,
}

/// POST /api/generate-reports
pub async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateReportRequest>, JsonRejection>,
) -> AppResult<Json<GenerateReportResponse>> {
    let Json(request) = body.map_err(|rejection| {
        AppError::with_message(ErrorCode::InvalidRequest, "Invalid request body")
            .with_details(rejection.body_text())
    })?;

    // System-category failures are logged by `AppError::into_response`
    let report = reports::generate_report(state.repo.as_ref(), &request)
        .await
        .map_err(|err| err.into_app_error(GENERATE_FAILED))?;

    Ok(Json(GenerateReportResponse {
        message: "Report generated and saved successfully!".into(),
        report,
    }))
}

/// GET /api/reports/latest?limit=N
pub async fn latest(
    State(state): State<AppState>,
    params: Result<Query<LatestParams>, QueryRejection>,
) -> AppResult<Json<Vec<ReportEnvelope>>> {
    let Query(params) = params.map_err(|rejection| {
        AppError::with_message(ErrorCode::InvalidFormat, "Invalid query string")
            .with_details(rejection.body_text())
    })?;

    let limit = params.limit.unwrap_or(state.latest_reports_limit);
    if !(1..=MAX_LATEST_REPORTS).contains(&limit) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("limit must be between 1 and {MAX_LATEST_REPORTS}"),
        ));
    }

    reports::latest_reports(state.repo.as_ref(), limit)
        .await
        .map(Json)
        .map_err(|err| err.into_app_error(FETCH_FAILED))
}

/// GET /api/reports/types
pub async fn types() -> Json<Vec<&'static str>> {
    Json(ReportKind::ALL.iter().map(|kind| kind.as_str()).collect())
}
