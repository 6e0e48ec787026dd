use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::JsonFields;
use tracing_subscriber::prelude::*;

use crate::config;

/// Installs the global JSON file logger.
///
/// stdout carries the LSP transport, so nothing is ever logged to the console.
/// The returned guard flushes the background writer when dropped and must be
/// held for the lifetime of the process.
pub fn init() -> anyhow::Result<WorkerGuard> {
    let data_dir = config::data_dir();

    std::fs::create_dir_all(&data_dir).inspect_err(|e| {
        eprintln!("Failed to create data directory: {}", e);
    })?;

    let file_appender = tracing_appender::rolling::never(&data_dir, config::log_file_name());
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(writer)
        .fmt_fields(JsonFields::default());

    // Use RUST_LOG if set, otherwise default to INFO
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .try_init()?;

    Ok(guard)
}
