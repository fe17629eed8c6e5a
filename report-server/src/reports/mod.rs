//! Report generation and lookup

pub mod aggregator;
pub mod builder;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{GenerateReportRequest, SourceData, build_payload, fetch_sources, generate_report};
pub use query::latest_reports;
pub use shared::models::ReportKind;
