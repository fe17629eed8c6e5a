//! Report-layer error type
//!
//! `ReportError` is what report generation and lookup fail with. Handlers turn
//! it into the shared `AppError` with [`ReportError::into_app_error`], which
//! picks the error code and keeps the cause in `details`.

use shared::error::{AppError, ErrorCode};
use shared::models::SourceTable;
use thiserror::Error;

use crate::db::RepoError;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unsupported report type: {0}")]
    UnsupportedReportType(String),

    #[error("Error fetching {table}: {message}")]
    UpstreamFetchFailure { table: SourceTable, message: String },

    #[error("Error inserting report: {0}")]
    UpstreamInsertFailure(String),

    #[error("No {0} data found")]
    EmptyRequiredDataset(SourceTable),

    #[error("No reports found")]
    NotFound,

    #[error("Invalid report payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<RepoError> for ReportError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Fetch { table, message } => Self::UpstreamFetchFailure { table, message },
            RepoError::Decode { table, message } => Self::UpstreamFetchFailure {
                table,
                message: format!("invalid row: {message}"),
            },
            RepoError::Insert(message) => Self::UpstreamInsertFailure(message),
        }
    }
}

impl ReportError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingParameter(_) => ErrorCode::RequiredField,
            Self::UnsupportedReportType(_) => ErrorCode::UnsupportedReportType,
            Self::UpstreamFetchFailure { .. } => ErrorCode::UpstreamFetchFailed,
            Self::UpstreamInsertFailure(_) => ErrorCode::UpstreamInsertFailed,
            Self::EmptyRequiredDataset(_) => ErrorCode::EmptyRequiredDataset,
            Self::NotFound => ErrorCode::ReportNotFound,
            Self::Serialization(_) => ErrorCode::ReportPayloadInvalid,
        }
    }

    /// Convert for an HTTP response
    ///
    /// Failures are reported under `message` with this error as the cause.
    /// A missing parameter keeps its own message.
    pub fn into_app_error(self, message: &str) -> AppError {
        match self {
            Self::MissingParameter(field) => AppError::required_field(field),
            other => AppError::with_message(other.code(), message).with_details(other.to_string()),
        }
    }
}
