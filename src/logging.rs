//! Tracing setup for the driver.
//!
//! Two streams with different jobs:
//! - stderr diagnostics, controlled by `RUST_LOG` (default `warn`, `debug`
//!   with `--verbose`); development noise, not product output
//! - a per-run log file under `<base>/logs/`, always at debug level, for
//!   inspecting what a run did after the fact
//!
//! The structured per-phase records are a separate concern and go through
//! the runner's [`crate::report::LogSink`], unaffected by `RUST_LOG`.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn stderr_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "genesis=debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize stderr-only diagnostics. Used by commands that do not
/// produce a run log.
pub fn init(verbose: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(stderr_filter(verbose))
        .init();
}

/// Initialize stderr diagnostics plus the per-run log file.
///
/// The returned guard must stay alive for the duration of the run or
/// buffered lines are lost.
pub fn init_with_file(verbose: bool, log_dir: &Path, file_name: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::never(log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_filter(stderr_filter(verbose)),
        )
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(LevelFilter::DEBUG),
        )
        .init();

    Ok(guard)
}
