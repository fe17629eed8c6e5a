//! Unified error codes for the reporting service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Report errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the dashboard can switch
/// on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Report ====================
    /// Report type is not one of the supported kinds
    UnsupportedReportType = 1001,
    /// A dataset required by the report type is empty
    EmptyRequiredDataset = 1002,
    /// No report has been generated yet
    ReportNotFound = 1003,
    /// Stored report payload could not be decoded
    ReportPayloadInvalid = 1004,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Reading a source table failed
    UpstreamFetchFailed = 9101,
    /// Writing a report failed
    UpstreamInsertFailed = 9102,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Report
            ErrorCode::UnsupportedReportType => "Unsupported report type",
            ErrorCode::EmptyRequiredDataset => "Required dataset is empty",
            ErrorCode::ReportNotFound => "No reports found",
            ErrorCode::ReportPayloadInvalid => "Report payload is invalid",

            // System
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::UpstreamFetchFailed => "Failed to fetch source data",
            ErrorCode::UpstreamInsertFailed => "Failed to save report",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Report
            1001 => Ok(ErrorCode::UnsupportedReportType),
            1002 => Ok(ErrorCode::EmptyRequiredDataset),
            1003 => Ok(ErrorCode::ReportNotFound),
            1004 => Ok(ErrorCode::ReportPayloadInvalid),

            // System
            9002 => Ok(ErrorCode::DatabaseError),
            9101 => Ok(ErrorCode::UpstreamFetchFailed),
            9102 => Ok(ErrorCode::UpstreamInsertFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::RequiredField.code(), 7);
        assert_eq!(ErrorCode::UnsupportedReportType.code(), 1001);
        assert_eq!(ErrorCode::EmptyRequiredDataset.code(), 1002);
        assert_eq!(ErrorCode::UpstreamFetchFailed.code(), 9101);
        assert_eq!(ErrorCode::UpstreamInsertFailed.code(), 9102);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(5), Ok(ErrorCode::InvalidRequest));
        assert_eq!(ErrorCode::try_from(1003), Ok(ErrorCode::ReportNotFound));
        assert_eq!(ErrorCode::try_from(9102), Ok(ErrorCode::UpstreamInsertFailed));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(3), Err(InvalidErrorCode(3)));
        assert_eq!(ErrorCode::try_from(9001), Err(InvalidErrorCode(9001)));
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::UnsupportedReportType).unwrap();
        assert_eq!(json, "1001");

        let code: ErrorCode = serde_json::from_str("9101").unwrap();
        assert_eq!(code, ErrorCode::UpstreamFetchFailed);

        assert!(serde_json::from_str::<ErrorCode>("77").is_err());
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::ReportNotFound.message(), "No reports found");
        assert!(!ErrorCode::EmptyRequiredDataset.message().is_empty());
    }
}
