//! Data models
//!
//! Source table rows, report kinds and the report envelope.

pub mod kind;
pub mod records;
pub mod report;

// Re-exports
pub use kind::*;
pub use records::*;
pub use report::*;
