//! Logging initialization.
//!
//! Console output plus a daily-rolling log file, filtered through
//! `RUST_LOG` when set.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "lendsync=info,reqwest=warn";

/// Initialize logging with console output and a daily-rolling file in
/// `log_dir`.
///
/// Returns the appender guard; keep it alive for the application lifetime
/// or buffered log lines are lost.
pub fn init_logging(log_dir: &str) -> crate::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| crate::Error::Other(format!("Failed to create log directory: {}", e)))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "lendsync.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()
        .map_err(|e| {
            crate::Error::Other(format!("Failed to set global default subscriber: {}", e))
        })?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(DEFAULT_LOG_FILTER.contains("lendsync=info"));
        assert!(DEFAULT_LOG_FILTER.contains("reqwest=warn"));
    }
}
