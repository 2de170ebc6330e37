use anyhow::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Build the level filter. `RUST_LOG` takes precedence over `log_level`.
pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Initialize console logging on stderr, plus an optional log file.
///
/// The returned guard flushes the file writer when dropped and must be kept
/// alive for as long as logging is needed.
pub fn init_logging(log_level: &str, log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let console_layer = fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(true);

    let registry = tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(console_layer);

    match log_file {
        Some(log_file_path) => {
            let path = Path::new(log_file_path);
            let directory = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            std::fs::create_dir_all(directory)?;
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid log file path: {}", log_file_path))?;

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));

            let file_layer = fmt::layer()
                .with_timer(UtcTime::rfc_3339())
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(writer);

            registry.with(file_layer).try_init()?;
            Ok(Some(guard))
        }
        None => {
            registry.try_init()?;
            Ok(None)
        }
    }
}
