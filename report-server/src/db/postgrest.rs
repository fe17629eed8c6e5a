//! PostgREST adapter (Supabase-style REST API, no SDK dependency)
//!
//! `GET {base}/rest/v1/{table}?select=..&user_id=eq.X` for reads and
//! `POST {base}/rest/v1/{table}` with `Prefer: return=representation` for the
//! report insert. Both carry the service key as `apikey` and bearer token.
//!
//! PostgREST caps every response at its `max-rows` setting, so source tables
//! are read in `limit`/`offset` pages with `Prefer: count=exact` until the
//! `Content-Range` total (or a short page, when the total is absent) says the
//! table is exhausted.

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{
    ActivityRecord, FeedbackRecord, NewReportEnvelope, RedemptionRecord, ReportEnvelope,
    SourceTable, TicketRecord, UserRecord,
};
use shared::util::{format_timestamp, parse_timestamp};

use super::{RepoError, RepoResult, ReportRepository, UserFilter};
use crate::config::PostgrestTables;

const USER_COLUMNS: &str = "user_id,created_at";
const FEEDBACK_COLUMNS: &str = "user_id,rating,submitted_at";
const ACTIVITY_COLUMNS: &str = "user_id,activity_type,activity_date";
const REDEMPTION_COLUMNS: &str = "user_id,is_active,redeemed_date,points_redeemed";
const TICKET_COLUMNS: &str = "ticket_id,user_id,created_at,updated_at,status";
const REPORT_COLUMNS: &str = "id,report_type,generated_at,data";

/// Rows requested per page; matches PostgREST's default `max-rows`
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Repository over a PostgREST endpoint
#[derive(Clone)]
pub struct PostgrestRepository {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    tables: PostgrestTables,
    page_size: usize,
}

/// One page of a select
struct Page<T> {
    rows: Vec<T>,
    /// Total row count from `Content-Range`, when the server reported one
    total: Option<usize>,
}

impl PostgrestRepository {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        tables: PostgrestTables,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            tables,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn table_name(&self, table: SourceTable) -> &str {
        match table {
            SourceTable::Users => &self.tables.users,
            SourceTable::Feedback => &self.tables.feedback,
            SourceTable::Activity => &self.tables.activity,
            SourceTable::Redemptions => &self.tables.redemptions,
            SourceTable::Tickets => &self.tables.tickets,
            SourceTable::Reports => &self.tables.reports,
        }
    }

    fn table_url(&self, table: SourceTable) -> RepoResult<Url> {
        let raw = format!("{}/rest/v1/{}", self.base_url, self.table_name(table));
        Url::parse(&raw).map_err(|e| RepoError::fetch(table, format!("invalid URL {raw}: {e}")))
    }

    /// URL selecting `columns`, filtered by user when the filter names one
    fn select_url(
        &self,
        table: SourceTable,
        columns: &str,
        filter: &UserFilter,
    ) -> RepoResult<Url> {
        let mut url = self.table_url(table)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", columns);
            if let Some(user_id) = filter.user_id() {
                query.append_pair("user_id", &format!("eq.{user_id}"));
            }
        }
        Ok(url)
    }

    fn latest_url(&self, limit: usize) -> RepoResult<Url> {
        let mut url = self.table_url(SourceTable::Reports)?;
        url.query_pairs_mut()
            .append_pair("select", REPORT_COLUMNS)
            .append_pair("order", "generated_at.desc,id.desc")
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        table: SourceTable,
        url: Url,
    ) -> RepoResult<Page<T>> {
        tracing::debug!(%table, path = url.path(), query = url.query(), "PostgREST select");
        let response = self
            .authorized(self.client.get(url))
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|e| RepoError::fetch(table, e))?;

        let status = response.status();
        let total = response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(content_range_total);
        let body = response
            .text()
            .await
            .map_err(|e| RepoError::fetch(table, e))?;
        if !status.is_success() {
            return Err(RepoError::fetch(table, format!("HTTP {status}: {body}")));
        }
        Ok(Page {
            rows: parse_rows(table, &body)?,
            total,
        })
    }

    /// Every row of `table`, read page by page
    async fn select<T: DeserializeOwned>(
        &self,
        table: SourceTable,
        columns: &str,
        filter: &UserFilter,
    ) -> RepoResult<Vec<T>> {
        let mut rows: Vec<T> = Vec::new();
        loop {
            let mut url = self.select_url(table, columns, filter)?;
            url.query_pairs_mut()
                .append_pair("limit", &self.page_size.to_string())
                .append_pair("offset", &rows.len().to_string());

            let page: Page<T> = self.get_page(table, url).await?;
            let received = page.rows.len();
            rows.extend(page.rows);

            let exhausted = match page.total {
                Some(total) => rows.len() >= total,
                None => received < self.page_size,
            };
            if exhausted || received == 0 {
                break;
            }
        }
        Ok(rows)
    }
}

/// Total from a `Content-Range` value such as `0-999/1500` (`*` when unknown)
fn content_range_total(value: &str) -> Option<usize> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

fn parse_rows<T: DeserializeOwned>(table: SourceTable, body: &str) -> RepoResult<Vec<T>> {
    serde_json::from_str(body).map_err(|e| RepoError::decode(table, e))
}

/// Insert body; `generated_at` goes out in storage form
#[derive(Serialize)]
struct InsertReport<'a> {
    report_type: &'a str,
    generated_at: String,
    data: &'a str,
}

/// Reports row as returned by PostgREST
///
/// `data` may be a text column (a JSON string) or a json column (a value).
#[derive(serde::Deserialize)]
struct ReportRow {
    id: i64,
    report_type: String,
    generated_at: String,
    data: serde_json::Value,
}

impl ReportRow {
    fn into_envelope(self) -> RepoResult<ReportEnvelope> {
        let generated_at = parse_timestamp(&self.generated_at)
            .map_err(|e| RepoError::decode(SourceTable::Reports, e))?;
        let data = match self.data {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        };
        Ok(ReportEnvelope {
            id: self.id,
            report_type: self.report_type,
            generated_at,
            data,
        })
    }
}

#[async_trait]
impl ReportRepository for PostgrestRepository {
    async fn fetch_users(&self, filter: &UserFilter) -> RepoResult<Vec<UserRecord>> {
        self.select(SourceTable::Users, USER_COLUMNS, filter).await
    }

    async fn fetch_feedback(&self, filter: &UserFilter) -> RepoResult<Vec<FeedbackRecord>> {
        self.select(SourceTable::Feedback, FEEDBACK_COLUMNS, filter).await
    }

    async fn fetch_activity(&self, filter: &UserFilter) -> RepoResult<Vec<ActivityRecord>> {
        self.select(SourceTable::Activity, ACTIVITY_COLUMNS, filter).await
    }

    async fn fetch_redemptions(&self, filter: &UserFilter) -> RepoResult<Vec<RedemptionRecord>> {
        self.select(SourceTable::Redemptions, REDEMPTION_COLUMNS, filter)
            .await
    }

    async fn fetch_tickets(&self, filter: &UserFilter) -> RepoResult<Vec<TicketRecord>> {
        self.select(SourceTable::Tickets, TICKET_COLUMNS, filter).await
    }

    async fn insert_report(&self, report: &NewReportEnvelope) -> RepoResult<ReportEnvelope> {
        let url = self
            .table_url(SourceTable::Reports)
            .map_err(|e| RepoError::Insert(e.to_string()))?;
        let body = InsertReport {
            report_type: &report.report_type,
            generated_at: format_timestamp(&report.generated_at),
            data: &report.data,
        };

        let response = self
            .authorized(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await
            .map_err(|e| RepoError::Insert(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RepoError::Insert(e.to_string()))?;
        if !status.is_success() {
            return Err(RepoError::Insert(format!("HTTP {status}: {text}")));
        }

        let rows: Vec<ReportRow> =
            serde_json::from_str(&text).map_err(|e| RepoError::Insert(e.to_string()))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::Insert("insert returned no rows".into()))?
            .into_envelope()
    }

    async fn latest_reports(&self, limit: usize) -> RepoResult<Vec<ReportEnvelope>> {
        let url = self.latest_url(limit)?;
        let page: Page<ReportRow> = self.get_page(SourceTable::Reports, url).await?;
        page.rows.into_iter().map(ReportRow::into_envelope).collect()
    }
}
