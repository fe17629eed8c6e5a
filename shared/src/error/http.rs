//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::ReportNotFound => StatusCode::NOT_FOUND,

            // 400 Bad Request
            Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange => StatusCode::BAD_REQUEST,

            // Generation failures are all reported as 500, including an
            // unsupported report type.
            Self::UnsupportedReportType
            | Self::EmptyRequiredDataset
            | Self::ReportPayloadInvalid => StatusCode::INTERNAL_SERVER_ERROR,

            // 500 Internal Server Error
            Self::DatabaseError
            | Self::UpstreamFetchFailed
            | Self::UpstreamInsertFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
        assert_eq!(ErrorCode::RequiredField.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::ReportNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::UnsupportedReportType.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::UpstreamFetchFailed.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
