use tracing_subscriber::{
    fmt,
    EnvFilter,
    Layer,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::{config::LoggingConfig, AnalyticsError, Result};

/// Sets up the logging subscriber for the service.
///
/// `RUST_LOG` takes precedence; otherwise `level` applies to this crate and
/// the HTTP tracing layer.
///
/// # Arguments
/// * `config` - Default level, e.g. `info` or `debug`, and whether to emit JSON lines
pub fn init_logger(config: &LoggingConfig) -> Result<()> {
    let level = config.level.as_str();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(level)))
        .map_err(|e| AnalyticsError::Config(format!("Invalid log level {}: {}", level, e)))?;

    let fmt_layer = if config.json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| AnalyticsError::Internal(format!("Failed to initialize logger: {}", e)))
}

fn default_directives(level: &str) -> String {
    format!(
        "{}={level},tower_http={level}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives("debug"),
            "region_latency_analytics=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_second_init_returns_error() {
        let config = LoggingConfig {
            level: "info".to_string(),
            json: false,
        };

        // The first call may already lose to another test's subscriber.
        let _ = init_logger(&config);
        assert!(init_logger(&config).is_err());
    }
}
