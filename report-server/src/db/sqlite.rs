//! SQLite adapter
//!
//! Handles the connection pool, migrations and the row-to-record mapping.

use std::str::FromStr;

use async_trait::async_trait;
use shared::error::AppError;
use shared::models::{
    ActivityRecord, FeedbackRecord, NewReportEnvelope, RedemptionRecord, ReportEnvelope,
    SourceTable, TicketRecord, TicketStatus, UserRecord, UserStatus,
};
use shared::util::{format_timestamp, parse_timestamp};
use sqlx::SqlitePool;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};

use super::{RepoError, RepoResult, ReportRepository, UserFilter};

/// Repository over a SQLite connection pool
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (or create) the database at `database_url` and apply migrations
    ///
    /// `sqlite::memory:` gets a single never-recycled connection so the
    /// database survives for the lifetime of the pool.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let in_memory = database_url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::database(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .busy_timeout(std::time::Duration::from_secs(5));
        if !in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        tracing::info!(in_memory, "Database connection established (SQLite)");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// Fresh in-memory database with the schema applied
    pub async fn in_memory() -> Result<Self, AppError> {
        Self::connect("sqlite::memory:").await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_rows<R>(
        &self,
        table: SourceTable,
        select: &str,
        key: &str,
        filter: &UserFilter,
    ) -> RepoResult<Vec<R>>
    where
        R: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let result = match filter.user_id() {
            Some(user_id) => {
                let sql = format!("{select} WHERE {key} = ? ORDER BY rowid");
                sqlx::query_as::<_, R>(&sql)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("{select} ORDER BY rowid");
                sqlx::query_as::<_, R>(&sql).fetch_all(&self.pool).await
            }
        };
        result.map_err(|e| RepoError::fetch(table, e))
    }
}

// =============================================================================
// Row types
// =============================================================================

fn timestamp(table: SourceTable, raw: &str) -> RepoResult<shared::Timestamp> {
    parse_timestamp(raw).map_err(|e| RepoError::decode(table, e))
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    created_at: String,
    status: Option<String>,
}

impl UserRow {
    fn into_record(self) -> RepoResult<UserRecord> {
        Ok(UserRecord {
            created_at: timestamp(SourceTable::Users, &self.created_at)?,
            id: self.id,
            status: self
                .status
                .as_deref()
                .map(UserStatus::parse)
                .unwrap_or_default(),
        })
    }
}

#[derive(sqlx::FromRow)]
struct FeedbackRow {
    user_id: String,
    rating: f64,
    submitted_at: String,
}

impl FeedbackRow {
    fn into_record(self) -> RepoResult<FeedbackRecord> {
        Ok(FeedbackRecord {
            submitted_at: timestamp(SourceTable::Feedback, &self.submitted_at)?,
            user_id: self.user_id,
            rating: self.rating,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    user_id: String,
    activity_type: String,
    activity_date: String,
}

impl ActivityRow {
    fn into_record(self) -> RepoResult<ActivityRecord> {
        Ok(ActivityRecord {
            activity_date: timestamp(SourceTable::Activity, &self.activity_date)?,
            user_id: self.user_id,
            activity_type: self.activity_type,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RedemptionRow {
    user_id: String,
    is_active: bool,
    redeemed_date: String,
    points_redeemed: i64,
}

impl RedemptionRow {
    fn into_record(self) -> RepoResult<RedemptionRecord> {
        Ok(RedemptionRecord {
            redeemed_date: timestamp(SourceTable::Redemptions, &self.redeemed_date)?,
            user_id: self.user_id,
            is_active: self.is_active,
            points_redeemed: self.points_redeemed,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: String,
    user_id: String,
    created_at: String,
    updated_at: Option<String>,
    status: String,
}

impl TicketRow {
    fn into_record(self) -> RepoResult<TicketRecord> {
        let updated_at = match self.updated_at.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(timestamp(SourceTable::Tickets, raw)?),
            _ => None,
        };
        Ok(TicketRecord {
            created_at: timestamp(SourceTable::Tickets, &self.created_at)?,
            updated_at,
            status: TicketStatus::parse(&self.status),
            id: self.id,
            user_id: self.user_id,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: i64,
    report_type: String,
    generated_at: String,
    data: String,
}

impl ReportRow {
    fn into_envelope(self) -> RepoResult<ReportEnvelope> {
        Ok(ReportEnvelope {
            generated_at: timestamp(SourceTable::Reports, &self.generated_at)?,
            id: self.id,
            report_type: self.report_type,
            data: self.data,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

#[async_trait]
impl ReportRepository for SqliteRepository {
    async fn fetch_users(&self, filter: &UserFilter) -> RepoResult<Vec<UserRecord>> {
        let rows: Vec<UserRow> = self
            .fetch_rows(
                SourceTable::Users,
                "SELECT id, created_at, status FROM users",
                "id",
                filter,
            )
            .await?;
        rows.into_iter().map(UserRow::into_record).collect()
    }

    async fn fetch_feedback(&self, filter: &UserFilter) -> RepoResult<Vec<FeedbackRecord>> {
        let rows: Vec<FeedbackRow> = self
            .fetch_rows(
                SourceTable::Feedback,
                "SELECT user_id, rating, submitted_at FROM feedback",
                "user_id",
                filter,
            )
            .await?;
        rows.into_iter().map(FeedbackRow::into_record).collect()
    }

    async fn fetch_activity(&self, filter: &UserFilter) -> RepoResult<Vec<ActivityRecord>> {
        let rows: Vec<ActivityRow> = self
            .fetch_rows(
                SourceTable::Activity,
                "SELECT user_id, activity_type, activity_date FROM activity_log",
                "user_id",
                filter,
            )
            .await?;
        rows.into_iter().map(ActivityRow::into_record).collect()
    }

    async fn fetch_redemptions(&self, filter: &UserFilter) -> RepoResult<Vec<RedemptionRecord>> {
        let rows: Vec<RedemptionRow> = self
            .fetch_rows(
                SourceTable::Redemptions,
                "SELECT user_id, is_active, redeemed_date, points_redeemed FROM redemptions",
                "user_id",
                filter,
            )
            .await?;
        rows.into_iter().map(RedemptionRow::into_record).collect()
    }

    async fn fetch_tickets(&self, filter: &UserFilter) -> RepoResult<Vec<TicketRecord>> {
        let rows: Vec<TicketRow> = self
            .fetch_rows(
                SourceTable::Tickets,
                "SELECT id, user_id, created_at, updated_at, status FROM support_tickets",
                "user_id",
                filter,
            )
            .await?;
        rows.into_iter().map(TicketRow::into_record).collect()
    }

    async fn insert_report(&self, report: &NewReportEnvelope) -> RepoResult<ReportEnvelope> {
        let generated_at = format_timestamp(&report.generated_at);
        let id = sqlx::query("INSERT INTO reports (report_type, generated_at, data) VALUES (?, ?, ?)")
            .bind(&report.report_type)
            .bind(&generated_at)
            .bind(&report.data)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Insert(e.to_string()))?
            .last_insert_rowid();

        tracing::debug!(id, report_type = %report.report_type, "Report inserted");

        ReportRow {
            id,
            report_type: report.report_type.clone(),
            generated_at,
            data: report.data.clone(),
        }
        .into_envelope()
    }

    async fn latest_reports(&self, limit: usize) -> RepoResult<Vec<ReportEnvelope>> {
        let rows = sqlx::query_as::<_, ReportRow>(
            "SELECT id, report_type, generated_at, data FROM reports ORDER BY generated_at DESC, id DESC LIMIT ?",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::fetch(SourceTable::Reports, e))?;

        rows.into_iter().map(ReportRow::into_envelope).collect()
    }
}
