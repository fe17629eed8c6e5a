//! Unified error system for the reporting service
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Error type with code, message and cause
//! - [`ErrorResponse`]: JSON body of failure responses
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Report errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::required_field("reportType");
//! assert_eq!(err.code, ErrorCode::RequiredField);
//!
//! let err = AppError::with_message(ErrorCode::UpstreamFetchFailed, "Failed to generate reports")
//!     .with_details("Error fetching users: timeout");
//! assert_eq!(err.http_status().as_u16(), 500);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorResponse};
