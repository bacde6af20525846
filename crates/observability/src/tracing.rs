//! Tracing/logging initialization.
//!
//! Emitter warnings (listener limit exceeded) and listener failures are
//! reported through `tracing`; nothing is printed unless a subscriber is
//! installed here or by the host application.

use tracing_subscriber::EnvFilter;

/// Output format of the fmt subscriber.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable single-line output.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directives used when `RUST_LOG` is unset.
    pub default_filter: String,
    pub format: LogFormat,
    /// Route output through the test harness capture.
    pub test_writer: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            format: LogFormat::Json,
            test_writer: false,
        }
    }
}

impl LogConfig {
    /// Plain output captured by `cargo test`, everything at `debug` and above.
    pub fn for_tests() -> Self {
        Self {
            default_filter: "debug".to_string(),
            format: LogFormat::Pretty,
            test_writer: true,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_filter))
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(config: &LogConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    // `try_init` fails once a global subscriber exists; that is the no-op case.
    let _ = match (config.format, config.test_writer) {
        (LogFormat::Json, false) => builder.json().try_init(),
        (LogFormat::Json, true) => builder.json().with_test_writer().try_init(),
        (LogFormat::Pretty, false) => builder.try_init(),
        (LogFormat::Pretty, true) => builder.with_test_writer().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(&LogConfig::for_tests());
        init(&LogConfig::default());
        ::tracing::info!("still alive");
    }

    #[test]
    fn builders_override_defaults() {
        let config = LogConfig::default()
            .with_filter("herald_events=trace")
            .with_format(LogFormat::Pretty);
        assert_eq!(config.default_filter, "herald_events=trace");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(!config.test_writer);
    }
}
