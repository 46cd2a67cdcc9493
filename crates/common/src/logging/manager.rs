//! Logging initialization and shutdown management.

use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::*;
use tracing_appender::{non_blocking::WorkerGuard, rolling::RollingFileAppender};
use tracing_subscriber::{
    fmt::layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::types::LoggerConfig;

/// Guard of the file writer thread, dropped on [`finalize`] to flush it.
static FILE_GUARD: OnceLock<Mutex<Option<WorkerGuard>>> = OnceLock::new();

/// Initializes the logging subsystem with the provided config.
///
/// Panics if a global subscriber was already installed.
pub fn init(config: LoggerConfig) {
    // INFO unless overridden via RUST_LOG.
    let filt = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    let stdout_sub = if config.stdout_config.json_format {
        layer()
            .json()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    } else {
        layer()
            .compact()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    };

    let file_layer = config.file_logging_config.as_ref().map(|file_config| {
        let file_appender = RollingFileAppender::new(
            file_config.rotation.clone(),
            &file_config.directory,
            &file_config.file_name_prefix,
        );
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        *FILE_GUARD.get_or_init(|| Mutex::new(None)).lock() = Some(guard);

        if file_config.json_format {
            layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filt.clone())
                .boxed()
        } else {
            layer()
                .compact()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filt.clone())
                .boxed()
        }
    });

    tracing_subscriber::registry()
        .with(stdout_sub)
        .with(file_layer)
        .init();

    info!(
        service_name = %config.service_name,
        service_version = ?config.service_version,
        "logging initialized"
    );
}

/// Shuts down the logging subsystem, flushing buffered file output.
///
/// Should be called right before exit. Events logged afterwards no longer
/// reach the log file.
pub fn finalize() {
    info!("shutting down logging");

    match FILE_GUARD.get().and_then(|g| g.lock().take()) {
        Some(guard) => drop(guard),
        None => debug!("no file writer to flush"),
    }
}
