//! Data access
//!
//! [`ReportRepository`] is the only seam between report logic and storage.
//! Two adapters implement it: [`SqliteRepository`] for local databases and
//! [`PostgrestRepository`] for a managed PostgREST endpoint.

pub mod postgrest;
pub mod sqlite;

pub use postgrest::PostgrestRepository;
pub use sqlite::SqliteRepository;

use async_trait::async_trait;
use shared::models::{
    ActivityRecord, FeedbackRecord, NewReportEnvelope, RedemptionRecord, ReportEnvelope,
    SourceTable, TicketRecord, UserRecord,
};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Error fetching {table}: {message}")]
    Fetch { table: SourceTable, message: String },

    #[error("Error inserting report: {0}")]
    Insert(String),

    #[error("Error decoding {table} row: {message}")]
    Decode { table: SourceTable, message: String },
}

impl RepoError {
    pub fn fetch(table: SourceTable, err: impl std::fmt::Display) -> Self {
        Self::Fetch {
            table,
            message: err.to_string(),
        }
    }

    pub fn decode(table: SourceTable, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            table,
            message: err.to_string(),
        }
    }

    /// Table the failed read targeted (`None` for inserts)
    pub fn table(&self) -> Option<SourceTable> {
        match self {
            Self::Fetch { table, .. } | Self::Decode { table, .. } => Some(*table),
            Self::Insert(_) => None,
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Row scope of a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    All,
    User(String),
}

impl UserFilter {
    /// Absent, blank or `all` (any case) selects every user
    pub fn from_request(user_id: Option<&str>) -> Self {
        match user_id.map(str::trim) {
            None | Some("") => Self::All,
            Some(id) if id.eq_ignore_ascii_case("all") => Self::All,
            Some(id) => Self::User(id.to_string()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::User(id) => Some(id),
        }
    }
}

/// Query and insert capability over the reporting tables
///
/// Every fetch honours the [`UserFilter`]; users are matched on their own id,
/// every other table on `user_id`.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn fetch_users(&self, filter: &UserFilter) -> RepoResult<Vec<UserRecord>>;

    async fn fetch_feedback(&self, filter: &UserFilter) -> RepoResult<Vec<FeedbackRecord>>;

    async fn fetch_activity(&self, filter: &UserFilter) -> RepoResult<Vec<ActivityRecord>>;

    async fn fetch_redemptions(&self, filter: &UserFilter) -> RepoResult<Vec<RedemptionRecord>>;

    async fn fetch_tickets(&self, filter: &UserFilter) -> RepoResult<Vec<TicketRecord>>;

    /// Persist one envelope and return it with its assigned id
    async fn insert_report(&self, report: &NewReportEnvelope) -> RepoResult<ReportEnvelope>;

    /// Newest envelopes first (`generated_at` desc, then id desc)
    async fn latest_reports(&self, limit: usize) -> RepoResult<Vec<ReportEnvelope>>;
}
