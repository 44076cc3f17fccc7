use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter { value: String, source: ParseError },
    #[error("could not open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("telemetry error: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Where log lines go. The interactive UI owns the terminal, so it logs to a
/// file; headless runs log to stderr.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
}

fn env_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(log_level).map_err(|source| TelemetryError::EnvFilter {
            value: log_level.to_string(),
            source,
        })
    })
}

pub fn init(log_level: &str, target: LogTarget<'_>) -> Result<(), TelemetryError> {
    let filter = env_filter(log_level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false);

    match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| TelemetryError::LogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            builder
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(TelemetryError::Subscriber)
        }
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(TelemetryError::Subscriber),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let result = env_filter("civic_dash=loudest");
        assert!(matches!(result, Err(TelemetryError::EnvFilter { .. })));
    }

    #[test]
    fn accepts_plain_level() {
        assert!(env_filter("debug").is_ok());
    }
}
