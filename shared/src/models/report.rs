//! Report envelope and payload union
//!
//! An envelope stores its payload as a JSON string in `data`. The shape of
//! that string depends on `report_type`, so readers go through
//! [`ReportEnvelope::decode`] rather than parsing `data` themselves.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::kind::{ReportKind, UnknownReportKind};
use crate::types::{Timestamp, UserId};
use crate::util::deserialize_timestamp;

// =============================================================================
// Payload rows
// =============================================================================

/// One user's row in the `User Engagement` report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEngagementRow {
    pub user_id: UserId,
    /// Signup day
    pub created_at: NaiveDate,
    pub activity_count: u64,
    pub feedback_count: u64,
    pub points_redeemed: i64,
    /// Mean rating rounded to 2 decimals, 0 without feedback
    pub avg_feedback_rating: f64,
}

/// One user's row in the `User Engagement - Activity` report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEngagementRow {
    pub user_id: UserId,
    pub activity_count: u64,
    /// Ascending
    pub activity_dates: Vec<Timestamp>,
}

/// One user's row in the `User Engagement - Feedback` report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEngagementRow {
    pub user_id: UserId,
    pub feedback_count: u64,
    /// Ascending
    pub feedback_dates: Vec<Timestamp>,
}

/// Rewards programme participation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardsStatus {
    Active,
    #[default]
    Inactive,
}

impl From<bool> for RewardsStatus {
    fn from(is_active: bool) -> Self {
        if is_active { Self::Active } else { Self::Inactive }
    }
}

/// One user's row in the `User Engagement - Rewards` report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsEngagementRow {
    pub user_id: UserId,
    pub points_redeemed: i64,
    /// Date of the redemption that was kept, `null` for users without one
    #[serde(default)]
    pub redeemed_date: Option<Timestamp>,
    #[serde(default)]
    pub rewards_status: RewardsStatus,
}

/// Payload of the `Ticket Metrics` report
///
/// Rates are fixed 2-decimal strings (`"50.00"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMetricsPayload {
    pub total_tickets: u64,
    pub resolved_tickets: u64,
    /// Percentage of resolved tickets
    pub resolution_rate: String,
    /// Mean hours from creation to resolution
    pub avg_response_time_hours: String,
    /// Tickets per distinct creation day
    pub submission_rate: String,
}

// =============================================================================
// Payload union
// =============================================================================

/// Structured report data, one variant per [`ReportKind`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportPayload {
    UserEngagement(Vec<UserEngagementRow>),
    ActivityEngagement(Vec<ActivityEngagementRow>),
    FeedbackEngagement(Vec<FeedbackEngagementRow>),
    RewardsEngagement(Vec<RewardsEngagementRow>),
    TicketMetrics(TicketMetricsPayload),
}

impl ReportPayload {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::UserEngagement(_) => ReportKind::UserEngagement,
            Self::ActivityEngagement(_) => ReportKind::ActivityEngagement,
            Self::FeedbackEngagement(_) => ReportKind::FeedbackEngagement,
            Self::RewardsEngagement(_) => ReportKind::RewardsEngagement,
            Self::TicketMetrics(_) => ReportKind::TicketMetrics,
        }
    }

    /// Serialize to the string stored in an envelope's `data`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse `data` for a known kind
    pub fn from_json(kind: ReportKind, data: &str) -> serde_json::Result<Self> {
        Ok(match kind {
            ReportKind::UserEngagement => Self::UserEngagement(serde_json::from_str(data)?),
            ReportKind::ActivityEngagement => {
                Self::ActivityEngagement(serde_json::from_str(data)?)
            }
            ReportKind::FeedbackEngagement => {
                Self::FeedbackEngagement(serde_json::from_str(data)?)
            }
            ReportKind::RewardsEngagement => Self::RewardsEngagement(serde_json::from_str(data)?),
            ReportKind::TicketMetrics => Self::TicketMetrics(serde_json::from_str(data)?),
        })
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// Failure to interpret an envelope's `data`
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error(transparent)]
    UnknownKind(#[from] UnknownReportKind),
    #[error("invalid {kind} payload: {source}")]
    Json {
        kind: ReportKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Stored report, as returned to clients
///
/// Field names are the Reports table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub id: i64,
    pub report_type: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub generated_at: Timestamp,
    /// JSON-serialized payload
    pub data: String,
}

impl ReportEnvelope {
    pub fn kind(&self) -> Result<ReportKind, UnknownReportKind> {
        self.report_type.parse()
    }

    /// Dispatch on `report_type` and parse `data`
    pub fn decode(&self) -> Result<ReportPayload, PayloadError> {
        let kind = self.kind()?;
        ReportPayload::from_json(kind, &self.data)
            .map_err(|source| PayloadError::Json { kind, source })
    }
}

/// Envelope about to be inserted (the store assigns `id`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReportEnvelope {
    pub report_type: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub generated_at: Timestamp,
    pub data: String,
}

impl NewReportEnvelope {
    pub fn new(payload: &ReportPayload, generated_at: Timestamp) -> serde_json::Result<Self> {
        Ok(Self {
            report_type: payload.kind().as_str().to_string(),
            generated_at,
            data: payload.to_json()?,
        })
    }

    pub fn with_id(self, id: i64) -> ReportEnvelope {
        ReportEnvelope {
            id,
            report_type: self.report_type,
            generated_at: self.generated_at,
            data: self.data,
        }
    }
}
