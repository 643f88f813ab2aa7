use env_logger::{Builder, Target};
use log::{Level, LevelFilter, SetLoggerError};
use std::env;
use std::io::Write;

use crate::models::ItemCategory;

fn parse_level(value: &str) -> LevelFilter {
    match value.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Installs an `env_logger` driven by `RUST_LOG`. Safe to call more than
/// once; later calls return the `SetLoggerError`.
pub fn init_logging() -> Result<(), SetLoggerError> {
    let env = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let log_level = parse_level(&env);

    let mut builder = Builder::from_default_env();

    builder.format(|buf, record| {
        let timestamp = buf.timestamp();
        let target = record.target();
        let file = record.file().unwrap_or("unknown");
        let line = record.line().unwrap_or(0);

        match record.level() {
            Level::Info => {
                writeln!(buf, "{} [INFO] [{}]: {}", timestamp, target, record.args())
            }
            level => {
                writeln!(
                    buf,
                    "{} [{}] [{}:{}] {}: {}",
                    timestamp, level, file, line, target, record.args()
                )
            }
        }
    });

    // Runtime internals are noisy at debug level
    builder.filter_module("tokio", LevelFilter::Info);

    builder.filter_level(log_level).target(Target::Stdout).try_init()
}

pub fn log_access_decision(category: ItemCategory, granted: bool, prompted: bool) {
    let how = if prompted { "after prompt" } else { "already authorized" };
    if granted {
        log::info!("[Access] {} access granted ({})", category, how);
    } else {
        log::warn!("[Access] {} access denied ({})", category, how);
    }
}

pub fn log_batch_committed(operation: &str, category: ItemCategory, items: usize, duration_ms: u64) {
    log::info!(
        "[Batch] {} committed {} {} item(s) in {}ms",
        operation, items, category, duration_ms
    );
}

pub fn log_batch_aborted(operation: &str, category: ItemCategory, error: &dyn std::error::Error) {
    log::warn!("[Batch] {} of {} items aborted: {}", operation, category, error);

    let mut source = error.source();
    while let Some(err) = source {
        log::warn!("  Caused by: {}", err);
        source = err.source();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_level("error"), LevelFilter::Error);
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
    }

    #[test]
    fn test_init_logging_only_once() {
        let _ = init_logging();
        assert!(init_logging().is_err());
    }
}
