//! Latest report lookup

use shared::models::ReportEnvelope;

use crate::db::ReportRepository;
use crate::error::ReportError;

/// The `limit` newest envelopes, newest first; `NotFound` when there are none
pub async fn latest_reports(
    repo: &dyn ReportRepository,
    limit: usize,
) -> Result<Vec<ReportEnvelope>, ReportError> {
    let limit = limit.max(1);
    let mut reports = repo.latest_reports(limit).await?;
    if reports.is_empty() {
        return Err(ReportError::NotFound);
    }
    reports.truncate(limit);
    Ok(reports)
}
