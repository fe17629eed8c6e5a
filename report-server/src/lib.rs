//! report-server: precomputed reports for the support and rewards dashboard
//!
//! Reads users, feedback, activity, redemptions and support tickets, turns
//! them into report envelopes, stores those, and serves the newest ones.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod reports;
pub mod state;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
