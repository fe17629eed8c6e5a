//! Source table rows
//!
//! Rows are read-only inputs to aggregation. Field names follow the table
//! columns, so the same types deserialize from PostgREST JSON and are built
//! from SQLite rows by the server.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Timestamp, UserId};
use crate::util::{
    deserialize_id, deserialize_optional_timestamp, deserialize_timestamp,
};

/// Account status of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    #[default]
    Other,
}

impl UserStatus {
    /// Parse a stored status (case-insensitive); unknown values map to `Other`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            _ => Self::Other,
        }
    }
}

impl<'de> Deserialize<'de> for UserStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}

/// Support ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Resolved,
    #[default]
    Other,
}

impl TicketStatus {
    /// Parse a stored status (case-insensitive); unknown values map to `Other`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" => Self::Open,
            "resolved" => Self::Resolved,
            _ => Self::Other,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl<'de> Deserialize<'de> for TicketStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}

/// Users table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(alias = "user_id", deserialize_with = "deserialize_id")]
    pub id: UserId,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: Timestamp,
    #[serde(default)]
    pub status: UserStatus,
}

/// Feedback table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: UserId,
    pub rating: f64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub submitted_at: Timestamp,
}

/// Activity log row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: UserId,
    #[serde(default)]
    pub activity_type: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub activity_date: Timestamp,
}

/// Rewards redemption row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: UserId,
    #[serde(default)]
    pub is_active: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub redeemed_date: Timestamp,
    #[serde(default)]
    pub points_redeemed: i64,
}

/// Support ticket row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    #[serde(alias = "ticket_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: UserId,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: Timestamp,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub status: TicketStatus,
}
