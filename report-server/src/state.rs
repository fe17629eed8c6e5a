//! Application state for the report server

use std::sync::Arc;

use crate::BoxError;
use crate::config::{Config, StorageBackend};
use crate::db::{PostgrestRepository, ReportRepository, SqliteRepository};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Storage adapter selected at start-up
    pub repo: Arc<dyn ReportRepository>,
    /// Default window of `/api/reports/latest`
    pub latest_reports_limit: usize,
}

impl AppState {
    pub fn new(repo: Arc<dyn ReportRepository>, latest_reports_limit: usize) -> Self {
        Self {
            repo,
            latest_reports_limit,
        }
    }

    /// Create the state for the configured backend
    pub async fn from_config(config: &Config) -> Result<Self, BoxError> {
        let repo: Arc<dyn ReportRepository> = match &config.storage {
            StorageBackend::Sqlite { database_url } => {
                tracing::info!(%database_url, "Using SQLite storage");
                Arc::new(SqliteRepository::connect(database_url).await?)
            }
            StorageBackend::Postgrest {
                base_url,
                api_key,
                tables,
            } => {
                tracing::info!(%base_url, "Using PostgREST storage");
                if api_key.is_empty() {
                    tracing::warn!("SUPABASE_KEY is empty; requests will be anonymous");
                }
                Arc::new(PostgrestRepository::new(
                    base_url.clone(),
                    api_key.clone(),
                    tables.clone(),
                ))
            }
        };

        Ok(Self::new(repo, config.latest_reports_limit))
    }
}
