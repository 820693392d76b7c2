use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let file_appender = match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.log_dir, &config.log_file),
        "daily" => tracing_appender::rolling::daily(&config.log_dir, &config.log_file),
        _ => tracing_appender::rolling::never(&config.log_dir, &config.log_file),
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true) // Keep target in JSON for structured queries
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        // stdout carries command output, so console logs go to stderr
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let console_layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_ansi(true);
        registry.with(file_layer).with(console_layer).init();
    }

    guard
}

fn filter_directives(config: &AppConfig) -> String {
    if config.log_sql {
        config.log_level.clone()
    } else {
        format!("{},sqlx=warn", config.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(log_sql: bool) -> AppConfig {
        let mut config = AppConfig::from_yaml(
            "log_level: debug\nlog_dir: ./logs\nlog_file: t.log\nuse_json: false\nrotation: never\n",
        )
        .unwrap();
        config.log_sql = log_sql;
        config
    }

    #[test]
    fn test_sql_logs_quieted_by_default() {
        assert_eq!(filter_directives(&config(false)), "debug,sqlx=warn");
        assert_eq!(filter_directives(&config(true)), "debug");
    }
}
