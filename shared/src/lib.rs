//! Shared types for the reporting service
//!
//! Record models, the report envelope and payload union, the unified
//! error system and timestamp helpers used by the server and its tests.

pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use http;
pub use types::{Timestamp, UserId};
