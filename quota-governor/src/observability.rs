//! Structured logging setup for processes embedding the governor.
//!
//! The governor itself only emits `tracing` events; the `audit` target carries the
//! audit trail. Enable the `observability` feature to install a subscriber.

use std::io;

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

impl LogFormat {
    /// Parses a format name; anything but `json` is [`LogFormat::Pretty`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") { Self::Json } else { Self::Pretty }
    }

    /// Reads the format from `LOG_FORMAT`, defaulting to pretty.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV).map(|v| Self::parse(&v)).unwrap_or_default()
    }
}

/// Installs a global subscriber writing to stderr.
///
/// The level filter comes from `RUST_LOG` and defaults to `info`. Hook spans are
/// closed with timing so each lifecycle pass reports its duration.
///
/// # Errors
///
/// Returns `ConfigError` if a global subscriber is already installed.
///
/// # Examples
///
/// ```no_run
/// use quota_governor::observability::{LogFormat, init_observability};
///
/// init_observability(LogFormat::from_env()).expect("subscriber installed once");
/// ```
pub fn init_observability(format: LogFormat) -> crate::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(io::stderr),
            )
            .try_init(),
    };
    installed
        .map_err(|e| crate::GovernorError::ConfigError(format!("cannot install subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_format() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("unknown"), LogFormat::Pretty);
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init_observability(LogFormat::Pretty);
        let err = init_observability(LogFormat::Json).unwrap_err();
        assert_eq!(err.kind(), "config_error");
    }
}
