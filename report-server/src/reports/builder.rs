//! Report generation
//!
//! validate request → fetch the kind's source tables → build the payload →
//! wrap it in an envelope → insert once.

use serde::Deserialize;
use shared::models::{
    ActivityEngagementRow, ActivityRecord, FeedbackEngagementRow, FeedbackRecord,
    NewReportEnvelope, RedemptionRecord, ReportEnvelope, ReportKind, ReportPayload,
    RewardsEngagementRow, RewardsStatus, SourceTable, TicketMetricsPayload, TicketRecord,
    UserEngagementRow, UserRecord,
};
use shared::util::{calendar_day, deserialize_optional_id, now};

use super::aggregator::{
    count_per_user, dates_per_user, fmt2, latest_redemptions, ratings_per_user, round2,
    ticket_stats,
};
use crate::db::{ReportRepository, UserFilter};
use crate::error::ReportError;

/// Body of a generation request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReportRequest {
    #[serde(default)]
    pub report_type: Option<String>,
    /// User id, `"all"` or absent
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub user_id: Option<String>,
}

impl GenerateReportRequest {
    pub fn new(report_type: impl Into<String>) -> Self {
        Self {
            report_type: Some(report_type.into()),
            user_id: None,
        }
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Check the request before anything is fetched
    pub fn validate(&self) -> Result<(ReportKind, UserFilter), ReportError> {
        let report_type = self
            .report_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ReportError::MissingParameter("reportType"))?;
        let kind = report_type
            .parse::<ReportKind>()
            .map_err(|_| ReportError::UnsupportedReportType(report_type.to_string()))?;
        Ok((kind, UserFilter::from_request(self.user_id.as_deref())))
    }
}

/// Rows fetched for one report; tables the kind does not read stay empty
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    pub users: Vec<UserRecord>,
    pub feedback: Vec<FeedbackRecord>,
    pub activity: Vec<ActivityRecord>,
    pub redemptions: Vec<RedemptionRecord>,
    pub tickets: Vec<TicketRecord>,
}

impl SourceData {
    fn is_empty(&self, table: SourceTable) -> bool {
        match table {
            SourceTable::Users => self.users.is_empty(),
            SourceTable::Feedback => self.feedback.is_empty(),
            SourceTable::Activity => self.activity.is_empty(),
            SourceTable::Redemptions => self.redemptions.is_empty(),
            SourceTable::Tickets => self.tickets.is_empty(),
            SourceTable::Reports => true,
        }
    }
}

/// Fetch the kind's source tables one after another, then check required ones
pub async fn fetch_sources(
    repo: &dyn ReportRepository,
    kind: ReportKind,
    filter: &UserFilter,
) -> Result<SourceData, ReportError> {
    let mut data = SourceData::default();
    for table in kind.sources() {
        match table {
            SourceTable::Users => data.users = repo.fetch_users(filter).await?,
            SourceTable::Feedback => data.feedback = repo.fetch_feedback(filter).await?,
            SourceTable::Activity => data.activity = repo.fetch_activity(filter).await?,
            SourceTable::Redemptions => data.redemptions = repo.fetch_redemptions(filter).await?,
            SourceTable::Tickets => data.tickets = repo.fetch_tickets(filter).await?,
            SourceTable::Reports => {}
        }
    }

    if let Some(table) = kind.required().iter().find(|t| data.is_empty(**t)) {
        return Err(ReportError::EmptyRequiredDataset(*table));
    }
    Ok(data)
}

// =============================================================================
// Payloads
// =============================================================================

pub fn build_payload(kind: ReportKind, data: &SourceData) -> ReportPayload {
    match kind {
        ReportKind::UserEngagement => ReportPayload::UserEngagement(user_engagement(data)),
        ReportKind::ActivityEngagement => {
            ReportPayload::ActivityEngagement(activity_engagement(data))
        }
        ReportKind::FeedbackEngagement => {
            ReportPayload::FeedbackEngagement(feedback_engagement(data))
        }
        ReportKind::RewardsEngagement => ReportPayload::RewardsEngagement(rewards_engagement(data)),
        ReportKind::TicketMetrics => ReportPayload::TicketMetrics(ticket_metrics(data)),
    }
}

fn user_engagement(data: &SourceData) -> Vec<UserEngagementRow> {
    let activity = count_per_user(&data.activity);
    let feedback = count_per_user(&data.feedback);
    let ratings = ratings_per_user(&data.feedback);
    let redemptions = latest_redemptions(&data.redemptions);

    data.users
        .iter()
        .map(|user| UserEngagementRow {
            user_id: user.id.clone(),
            created_at: calendar_day(&user.created_at),
            activity_count: activity.get(&user.id).copied().unwrap_or(0),
            feedback_count: feedback.get(&user.id).copied().unwrap_or(0),
            points_redeemed: redemptions
                .get(&user.id)
                .map(|r| r.points_redeemed)
                .unwrap_or(0),
            avg_feedback_rating: round2(
                ratings.get(&user.id).map(|s| s.mean()).unwrap_or(0.0),
            ),
        })
        .collect()
}

fn activity_engagement(data: &SourceData) -> Vec<ActivityEngagementRow> {
    let mut dates = dates_per_user(&data.activity);
    data.users
        .iter()
        .map(|user| {
            let activity_dates = dates.remove(&user.id).unwrap_or_default();
            ActivityEngagementRow {
                user_id: user.id.clone(),
                activity_count: activity_dates.len() as u64,
                activity_dates,
            }
        })
        .collect()
}

fn feedback_engagement(data: &SourceData) -> Vec<FeedbackEngagementRow> {
    let mut dates = dates_per_user(&data.feedback);
    data.users
        .iter()
        .map(|user| {
            let feedback_dates = dates.remove(&user.id).unwrap_or_default();
            FeedbackEngagementRow {
                user_id: user.id.clone(),
                feedback_count: feedback_dates.len() as u64,
                feedback_dates,
            }
        })
        .collect()
}

fn rewards_engagement(data: &SourceData) -> Vec<RewardsEngagementRow> {
    let redemptions = latest_redemptions(&data.redemptions);
    data.users
        .iter()
        .map(|user| match redemptions.get(&user.id) {
            Some(kept) => RewardsEngagementRow {
                user_id: user.id.clone(),
                points_redeemed: kept.points_redeemed,
                redeemed_date: Some(kept.redeemed_date),
                rewards_status: RewardsStatus::from(kept.is_active),
            },
            None => RewardsEngagementRow {
                user_id: user.id.clone(),
                points_redeemed: 0,
                redeemed_date: None,
                rewards_status: RewardsStatus::Inactive,
            },
        })
        .collect()
}

fn ticket_metrics(data: &SourceData) -> TicketMetricsPayload {
    let stats = ticket_stats(&data.tickets);
    TicketMetricsPayload {
        total_tickets: stats.total,
        resolved_tickets: stats.resolved,
        resolution_rate: fmt2(stats.resolution_rate),
        avg_response_time_hours: fmt2(stats.avg_resolution_hours),
        submission_rate: fmt2(stats.submission_rate),
    }
}

// =============================================================================
// Generation
// =============================================================================

/// Generate, persist and return one report
pub async fn generate_report(
    repo: &dyn ReportRepository,
    request: &GenerateReportRequest,
) -> Result<ReportEnvelope, ReportError> {
    let (kind, filter) = request.validate()?;
    tracing::info!(report_type = %kind, user = ?filter.user_id(), "Generating report");

    let data = fetch_sources(repo, kind, &filter).await?;
    let payload = build_payload(kind, &data);
    let envelope = NewReportEnvelope::new(&payload, now())?;

    let stored = repo.insert_report(&envelope).await?;
    tracing::info!(id = stored.id, report_type = %kind, "Report generated");
    Ok(stored)
}
