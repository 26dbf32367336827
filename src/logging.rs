//! Diagnostic logging for the checker itself.
//!
//! The subscriber is installed only when `WPFCHECK_LOG` (or `RUST_LOG`) is
//! set, so a normal lint run pays nothing for it:
//!
//! ```bash
//! WPFCHECK_LOG=debug wpfcheck lint src/
//! WPFCHECK_LOG=wpfcheck::detect=trace WPFCHECK_LOG_FORMAT=json wpfcheck lint .
//! ```
//!
//! Output always goes to stderr; stdout is reserved for reports.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "WPFCHECK_LOG";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "WPFCHECK_LOG_FORMAT";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain `fmt` lines (default).
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parse a format name, falling back to text for anything unknown.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var(LOG_FORMAT_ENV).unwrap_or_default())
    }
}

fn build_filter() -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber if logging was requested.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    if std::env::var(LOG_ENV).is_err() && std::env::var("RUST_LOG").is_err() {
        return;
    }

    let filter = build_filter();
    let installed = match LogFormat::from_env() {
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(layer).try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            Registry::default().with(filter).with(layer).try_init()
        }
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("tree"), LogFormat::Text);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
    }

    #[test]
    fn test_init_tracing_is_repeatable() {
        std::env::set_var(LOG_ENV, "off");
        std::env::set_var(LOG_FORMAT_ENV, "json");
        init_tracing();
        std::env::set_var(LOG_FORMAT_ENV, "text");
        init_tracing();
        std::env::remove_var(LOG_FORMAT_ENV);
        std::env::remove_var(LOG_ENV);
    }
}
