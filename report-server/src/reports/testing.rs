//! In-memory repository for unit tests

use std::sync::Mutex;

use async_trait::async_trait;
use shared::models::{
    ActivityRecord, FeedbackRecord, NewReportEnvelope, RedemptionRecord, ReportEnvelope,
    SourceTable, TicketRecord, UserRecord,
};

use crate::db::{RepoError, RepoResult, ReportRepository, UserFilter};

#[derive(Default)]
pub struct MemoryRepository {
    pub users: Vec<UserRecord>,
    pub feedback: Vec<FeedbackRecord>,
    pub activity: Vec<ActivityRecord>,
    pub redemptions: Vec<RedemptionRecord>,
    pub tickets: Vec<TicketRecord>,
    /// Fetches of this table fail
    pub fail_fetch: Option<SourceTable>,
    pub fail_insert: bool,
    /// Tables in the order they were fetched
    pub fetched: Mutex<Vec<SourceTable>>,
    pub reports: Mutex<Vec<ReportEnvelope>>,
}

impl MemoryRepository {
    pub fn fetched(&self) -> Vec<SourceTable> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn stored(&self) -> Vec<ReportEnvelope> {
        self.reports.lock().unwrap().clone()
    }

    fn record(&self, table: SourceTable) -> RepoResult<()> {
        self.fetched.lock().unwrap().push(table);
        if self.fail_fetch == Some(table) {
            return Err(RepoError::fetch(table, "connection reset"));
        }
        Ok(())
    }
}

fn scoped<T: Clone>(rows: &[T], filter: &UserFilter, user_id: impl Fn(&T) -> &str) -> Vec<T> {
    rows.iter()
        .filter(|row| filter.user_id().is_none_or(|id| user_id(row) == id))
        .cloned()
        .collect()
}

#[async_trait]
impl ReportRepository for MemoryRepository {
    async fn fetch_users(&self, filter: &UserFilter) -> RepoResult<Vec<UserRecord>> {
        self.record(SourceTable::Users)?;
        Ok(scoped(&self.users, filter, |u| u.id.as_str()))
    }

    async fn fetch_feedback(&self, filter: &UserFilter) -> RepoResult<Vec<FeedbackRecord>> {
        self.record(SourceTable::Feedback)?;
        Ok(scoped(&self.feedback, filter, |f| f.user_id.as_str()))
    }

    async fn fetch_activity(&self, filter: &UserFilter) -> RepoResult<Vec<ActivityRecord>> {
        self.record(SourceTable::Activity)?;
        Ok(scoped(&self.activity, filter, |a| a.user_id.as_str()))
    }

    async fn fetch_redemptions(&self, filter: &UserFilter) -> RepoResult<Vec<RedemptionRecord>> {
        self.record(SourceTable::Redemptions)?;
        Ok(scoped(&self.redemptions, filter, |r| r.user_id.as_str()))
    }

    async fn fetch_tickets(&self, filter: &UserFilter) -> RepoResult<Vec<TicketRecord>> {
        self.record(SourceTable::Tickets)?;
        Ok(scoped(&self.tickets, filter, |t| t.user_id.as_str()))
    }

    async fn insert_report(&self, report: &NewReportEnvelope) -> RepoResult<ReportEnvelope> {
        if self.fail_insert {
            return Err(RepoError::Insert("permission denied".into()));
        }
        let mut reports = self.reports.lock().unwrap();
        let envelope = report.clone().with_id(reports.len() as i64 + 1);
        reports.push(envelope.clone());
        Ok(envelope)
    }

    async fn latest_reports(&self, limit: usize) -> RepoResult<Vec<ReportEnvelope>> {
        self.record(SourceTable::Reports)?;
        let mut reports = self.stored();
        reports.sort_by(|a, b| {
            b.generated_at
                .cmp(&a.generated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        reports.truncate(limit);
        Ok(reports)
    }
}
