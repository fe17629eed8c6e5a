//! Common type aliases for the shared crate

use chrono::{DateTime, FixedOffset};

/// Point in time as stored by the source tables, offset preserved
pub type Timestamp = DateTime<FixedOffset>;

/// User identifier (numeric keys are normalised to their decimal text)
pub type UserId = String;
