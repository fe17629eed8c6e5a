//! Aggregation over source rows
//!
//! Pure functions of their inputs. Empty inputs give zero-valued results.

use std::collections::{HashMap, HashSet};

use shared::Timestamp;
use shared::models::{ActivityRecord, FeedbackRecord, RedemptionRecord, TicketRecord};
use shared::util::calendar_day;

/// A dated row that belongs to one user
pub trait UserEvent {
    fn user_id(&self) -> &str;
    fn occurred_at(&self) -> &Timestamp;
}

impl UserEvent for FeedbackRecord {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn occurred_at(&self) -> &Timestamp {
        &self.submitted_at
    }
}

impl UserEvent for ActivityRecord {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn occurred_at(&self) -> &Timestamp {
        &self.activity_date
    }
}

/// Rows per user; absent users have an implicit count of 0
pub fn count_per_user<R: UserEvent>(rows: &[R]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for row in rows {
        *counts.entry(row.user_id().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Event timestamps per user, ascending
pub fn dates_per_user<R: UserEvent>(rows: &[R]) -> HashMap<String, Vec<Timestamp>> {
    let mut dates: HashMap<String, Vec<Timestamp>> = HashMap::new();
    for row in rows {
        dates
            .entry(row.user_id().to_string())
            .or_default()
            .push(*row.occurred_at());
    }
    for list in dates.values_mut() {
        list.sort();
    }
    dates
}

/// The redemption kept for a user
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestRedemption {
    pub points_redeemed: i64,
    pub redeemed_date: Timestamp,
    pub is_active: bool,
}

/// One redemption per user: latest `redeemed_date`, ties go to the later row
pub fn latest_redemptions(rows: &[RedemptionRecord]) -> HashMap<String, LatestRedemption> {
    let mut latest: HashMap<String, LatestRedemption> = HashMap::new();
    for row in rows {
        let candidate = LatestRedemption {
            points_redeemed: row.points_redeemed,
            redeemed_date: row.redeemed_date,
            is_active: row.is_active,
        };
        latest
            .entry(row.user_id.clone())
            .and_modify(|kept| {
                if candidate.redeemed_date >= kept.redeemed_date {
                    *kept = candidate;
                }
            })
            .or_insert(candidate);
    }
    latest
}

/// Running rating total, kept at full precision
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingStats {
    pub sum: f64,
    pub count: u64,
}

impl RatingStats {
    pub fn add(&mut self, rating: f64) {
        self.sum += rating;
        self.count += 1;
    }

    pub fn merge(&mut self, other: RatingStats) {
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Mean rating, 0 without ratings
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

pub fn ratings_per_user(rows: &[FeedbackRecord]) -> HashMap<String, RatingStats> {
    let mut stats: HashMap<String, RatingStats> = HashMap::new();
    for row in rows {
        stats.entry(row.user_id.clone()).or_default().add(row.rating);
    }
    stats
}

/// Round to 2 decimal places for display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fixed 2-decimal rendering used for rates
pub fn fmt2(value: f64) -> String {
    format!("{value:.2}")
}

/// Global support ticket statistics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TicketStats {
    pub total: u64,
    pub resolved: u64,
    /// Percent, 0 without tickets
    pub resolution_rate: f64,
    /// Mean creation-to-update hours over resolved tickets with an update time
    pub avg_resolution_hours: f64,
    /// Tickets per distinct creation day
    pub submission_rate: f64,
}

pub fn ticket_stats(tickets: &[TicketRecord]) -> TicketStats {
    let total = tickets.len() as u64;
    let resolved = tickets.iter().filter(|t| t.status.is_resolved()).count() as u64;

    let resolution_rate = if total == 0 {
        0.0
    } else {
        resolved as f64 / total as f64 * 100.0
    };

    let resolution_hours: Vec<f64> = tickets
        .iter()
        .filter(|t| t.status.is_resolved())
        .filter_map(|t| {
            t.updated_at
                .map(|updated| (updated - t.created_at).num_milliseconds() as f64 / 3_600_000.0)
        })
        .collect();
    let avg_resolution_hours =
        resolution_hours.iter().sum::<f64>() / resolution_hours.len().max(1) as f64;

    let days: HashSet<_> = tickets.iter().map(|t| calendar_day(&t.created_at)).collect();
    let submission_rate = total as f64 / days.len().max(1) as f64;

    TicketStats {
        total,
        resolved,
        resolution_rate,
        avg_resolution_hours,
        submission_rate,
    }
}
