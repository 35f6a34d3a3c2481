//! Logging utilities for the GeoHosting services.
//!
//! Installs a `tracing` subscriber with a console layer and, when
//! `[logging].directory` is configured, a daily rolling file layer.

use geohosting_config::models::LoggingConfig;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix for the rolling log files.
pub const LOG_FILE_PREFIX: &str = "geohosting_front.log";

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` wins over `level` when it is set. The returned guard must be
/// held for the lifetime of the process, otherwise buffered file output is
/// lost on shutdown.
pub fn init_with_level(level: &str, directory: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(format!("geohosting={level},tower_http={level}"))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    });

    let (file_layer, guard) = match directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    // try_init: tests and embedding binaries may have set a subscriber already
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(file_layer)
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
    guard
}

/// Initialize logging from the `[logging]` config section.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    init_with_level(&config.level, config.directory.as_deref())
}
