//! Report server configuration

use crate::BoxError;

/// Upper bound for `?limit=` on the latest-reports endpoint
pub const MAX_LATEST_REPORTS: usize = 50;

/// PostgREST table names for each logical table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgrestTables {
    pub users: String,
    pub feedback: String,
    pub activity: String,
    pub redemptions: String,
    pub tickets: String,
    pub reports: String,
}

impl Default for PostgrestTables {
    fn default() -> Self {
        Self {
            users: "01_users".into(),
            feedback: "07_feedback".into(),
            activity: "03_activity_log".into(),
            redemptions: "04_rewards".into(),
            tickets: "05_support_ticket".into(),
            reports: "12_reports".into(),
        }
    }
}

/// Where report data lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Local SQLite database (env: DATABASE_URL)
    Sqlite { database_url: String },
    /// Managed PostgREST endpoint (env: SUPABASE_URL + SUPABASE_KEY)
    Postgrest {
        base_url: String,
        api_key: String,
        tables: PostgrestTables,
    },
}

/// Report server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port (env: HTTP_PORT, falling back to PORT)
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    pub storage: StorageBackend,
    /// Default number of envelopes returned by `/api/reports/latest`
    pub latest_reports_limit: usize,
    /// Fallback log level when RUST_LOG is unset
    pub log_level: String,
    /// JSON log lines (env: LOG_FORMAT=json)
    pub log_json: bool,
    /// Directory for rolling log files
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let http_port = match var("HTTP_PORT").or_else(|| var("PORT")) {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| format!("invalid HTTP port: {p}"))?,
            None => 5001,
        };

        let storage = match var("SUPABASE_URL") {
            Some(base_url) => StorageBackend::Postgrest {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key: Self::require_secret(&lookup, "SUPABASE_KEY", &environment)?,
                tables: PostgrestTables {
                    users: var("REPORTS_TABLE_USERS").unwrap_or_else(|| "01_users".into()),
                    feedback: var("REPORTS_TABLE_FEEDBACK")
                        .unwrap_or_else(|| "07_feedback".into()),
                    activity: var("REPORTS_TABLE_ACTIVITY")
                        .unwrap_or_else(|| "03_activity_log".into()),
                    redemptions: var("REPORTS_TABLE_REDEMPTIONS")
                        .unwrap_or_else(|| "04_rewards".into()),
                    tickets: var("REPORTS_TABLE_TICKETS")
                        .unwrap_or_else(|| "05_support_ticket".into()),
                    reports: var("REPORTS_TABLE_REPORTS").unwrap_or_else(|| "12_reports".into()),
                },
            },
            None => StorageBackend::Sqlite {
                database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite:reports.db".into()),
            },
        };

        let latest_reports_limit = match var("LATEST_REPORTS_LIMIT") {
            Some(n) => n
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid LATEST_REPORTS_LIMIT: {n}"))?
                .clamp(1, MAX_LATEST_REPORTS),
            None => 2,
        };

        Ok(Self {
            http_port,
            environment,
            storage,
            latest_reports_limit,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: var("LOG_FORMAT").is_some_and(|f| f.trim().eq_ignore_ascii_case("json")),
            log_dir: var("LOG_DIR"),
        })
    }

    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret<F>(lookup: &F, name: &str, environment: &str) -> Result<String, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let val = match lookup(name) {
            Some(v) => v,
            None => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                String::new()
            }
        };
        if val.trim().is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
