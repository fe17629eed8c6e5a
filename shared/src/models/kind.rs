//! Report kinds and the source tables each one reads

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Logical tables of the reporting database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTable {
    Users,
    Feedback,
    Activity,
    Redemptions,
    Tickets,
    Reports,
}

impl SourceTable {
    /// Name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Feedback => "feedback",
            Self::Activity => "activity",
            Self::Redemptions => "redemptions",
            Self::Tickets => "tickets",
            Self::Reports => "reports",
        }
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Supported report types
///
/// The wire name (`as_str`) is what clients send as `reportType` and what is
/// stored in the envelope's `report_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    UserEngagement,
    ActivityEngagement,
    FeedbackEngagement,
    RewardsEngagement,
    TicketMetrics,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        Self::UserEngagement,
        Self::ActivityEngagement,
        Self::FeedbackEngagement,
        Self::RewardsEngagement,
        Self::TicketMetrics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserEngagement => "User Engagement",
            Self::ActivityEngagement => "User Engagement - Activity",
            Self::FeedbackEngagement => "User Engagement - Feedback",
            Self::RewardsEngagement => "User Engagement - Rewards",
            Self::TicketMetrics => "Ticket Metrics",
        }
    }

    /// Tables fetched for this kind, in fetch order (users always first)
    pub fn sources(&self) -> &'static [SourceTable] {
        use SourceTable::*;
        match self {
            Self::UserEngagement => &[Users, Feedback, Activity, Redemptions],
            Self::ActivityEngagement => &[Users, Activity],
            Self::FeedbackEngagement => &[Users, Feedback],
            Self::RewardsEngagement => &[Users, Redemptions],
            Self::TicketMetrics => &[Users, Tickets],
        }
    }

    /// Tables that must not come back empty
    pub fn required(&self) -> &'static [SourceTable] {
        match self {
            Self::TicketMetrics => &[SourceTable::Tickets],
            _ => &[],
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report type string that names no [`ReportKind`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported report type: {0}")]
pub struct UnknownReportKind(pub String);

impl FromStr for ReportKind {
    type Err = UnknownReportKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| UnknownReportKind(s.to_string()))
    }
}

impl Serialize for ReportKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReportKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
