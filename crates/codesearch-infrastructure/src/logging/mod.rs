//! Tracing/logging initialization: structured, rolling file logs under
//! `<base>/logs/`, with level filtering from `RUST_LOG`/`CODESEARCH_LOG`.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, Layer};

/// Initialize the global tracing subscriber, writing JSON-formatted,
/// daily-rolling logs to `<logs_dir>/codesearch.log` while also echoing
/// to stderr at a coarser level. The returned guard must be held for the
/// lifetime of the process; dropping it stops the background log writer.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init(logs_dir: &Path) -> Result<WorkerGuard, tracing_subscriber::util::TryInitError> {
    std::fs::create_dir_all(logs_dir).ok();
    let file_appender = rolling::daily(logs_dir, "codesearch.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_env("CODESEARCH_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter);

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    let subscriber = tracing_subscriber::registry().with(file_layer).with(stderr_layer);
    subscriber.try_init()?;

    Ok(guard)
}
