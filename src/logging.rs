use std::fs::OpenOptions;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::shared::config::LoggingConfig;
use tracing::info;

/// Maps the accepted level names to a filter. `warning`, `fatal` and `panic`
/// are kept for compatibility with existing configs.
pub fn parse_level(level: &str) -> anyhow::Result<LevelFilter> {
    let filter = match level.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" | "fatal" | "panic" => LevelFilter::ERROR,
        other => anyhow::bail!("not a valid log level: {other:?}"),
    };
    Ok(filter)
}

/// Installs the global subscriber. The returned guard flushes the file writer
/// on drop and must be held until the process exits.
pub fn init(cfg: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = parse_level(&cfg.level)?;

    let guard = if cfg.output == "-" {
        let stdout_layer = fmt::layer().with_ansi(true).with_filter(filter);
        tracing_subscriber::registry().with(stdout_layer).try_init()?;
        None
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cfg.output)
            .map_err(|e| anyhow::anyhow!("unable to open file {} for writing: {}", cfg.output, e))?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(filter);
        tracing_subscriber::registry().with(file_layer).try_init()?;
        Some(guard)
    };

    info!(target: "ch_optimizer::logging", level = %filter, output = %cfg.output, "Logging initialized");
    Ok(guard)
}

#[cfg(test)]
pub fn init_for_tests() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive("ch_optimizer=debug".parse().unwrap());

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}
