use std::io;
use tracing_subscriber::{fmt, EnvFilter};

use configs::{LogFormat, LoggingConfig};

/// Install the global subscriber described by `[logging]`.
/// - Respects `RUST_LOG` if set, otherwise uses the format's default filter
/// - Writes to stdout to improve visibility in environments that hide stderr
/// - A second call is a no-op
pub fn init_logging(cfg: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(cfg.format)));
    let builder = fmt().with_env_filter(env_filter).with_target(false).with_writer(io::stdout);
    let _ = match cfg.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Compact output, `info,sea_orm=warn,sqlx=warn` unless `RUST_LOG` says otherwise.
pub fn init_logging_default() {
    init_logging(&LoggingConfig { format: LogFormat::Compact });
}

/// JSON output for container log collectors.
pub fn init_logging_json() {
    init_logging(&LoggingConfig { format: LogFormat::Json });
}

// override with e.g. RUST_LOG=info,service::cake=trace
fn default_filter(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Compact => "info,sea_orm=warn,sqlx=warn",
        LogFormat::Json => "info,service::cake=debug,sea_orm=warn,sqlx=warn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_filter_surfaces_service_spans() {
        assert!(default_filter(LogFormat::Json).contains("service::cake=debug"));
        assert!(!default_filter(LogFormat::Compact).contains("service::cake"));
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(&LoggingConfig { format: LogFormat::Json });
        init_logging(&LoggingConfig::default());
        init_logging_default();
        init_logging_json();
    }
}
