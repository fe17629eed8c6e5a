//! Logging Infrastructure
//!
//! Console logging by default, daily-rolling files when a log directory exists.
//! Output is plain text or JSON lines.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Default filter when neither RUST_LOG nor an explicit level is given
const DEFAULT_FILTER: &str = "report_server=info,tower_http=info";

type FmtLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Build the filter: RUST_LOG wins, then `log_level`, then the default
fn env_filter(log_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match log_level {
        Some(level) if !level.trim().is_empty() => {
            EnvFilter::new(format!("report_server={level},tower_http={level}"))
        }
        _ => EnvFilter::new(DEFAULT_FILTER),
    })
}

/// Initialize the logger
///
/// The returned guard flushes buffered lines on drop; hold it in `main`.
pub fn init_logger(log_level: Option<&str>, json: bool, log_dir: Option<&str>) -> WorkerGuard {
    let file_dir = log_dir.map(Path::new).filter(|dir| dir.is_dir());
    let to_file = file_dir.is_some();

    let (writer, guard) = match file_dir {
        Some(dir) => {
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "report-server"))
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(!to_file)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);
    let layer: FmtLayer = if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(layer)
        .init();

    if let Some(dir) = log_dir
        && !to_file
    {
        tracing::warn!("LOG_DIR {dir} is not a directory, logging to stdout");
    }
    guard
}
