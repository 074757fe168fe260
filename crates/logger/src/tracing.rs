use std::env::{VarError, var};

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format selected through `RUST_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

impl LogFormat {
    /// Anything other than `json` (case-insensitive) falls back to the compact format.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") { Self::Json } else { Self::Compact }
    }
}

/// Initialize the global subscriber at `info`, honouring `RUST_LOG` and `RUST_LOG_FORMAT`.
pub fn init() {
    init_with(LevelFilter::INFO);
}

/// Initialize the global subscriber with a custom default level.
///
/// `RUST_LOG` directives still take precedence over `level`.
pub fn init_with(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let (format, format_error) = match var("RUST_LOG_FORMAT") {
        Ok(raw) => (LogFormat::parse(&raw), None),
        Err(VarError::NotPresent) => (LogFormat::default(), None),
        Err(error) => (LogFormat::default(), Some(error)),
    };

    let log_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();

    // Only reported once a subscriber exists to receive it.
    if let Some(error) = format_error {
        warn!("Failed to read RUST_LOG_FORMAT, falling back to compact output: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse(""), LogFormat::Compact);
    }
}
