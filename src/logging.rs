//! Centralized logging configuration for dydx_v3
//!
//! This module provides structured logging using the `tracing` crate with:
//! - JSON formatted output by default (parseable by log aggregation tools)
//! - Pretty-print format for development (`LOG_FORMAT=pretty`)
//! - Configurable log levels via `RUST_LOG`
//! - Redaction helpers for API secrets, passphrases and signatures
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUST_LOG` | `dydx_v3=info` | Log level filter (standard tracing format) |
//! | `LOG_FORMAT` | `json` | Output format: `json` or `pretty` |
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use dydx_v3::logging::{init_logging, SanitizedValue};
//!
//! init_logging();
//! tracing::info!(secret = %SanitizedValue::new(&credentials.secret), "Credentials loaded");
//! ```

use std::env;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{fmt as ts_fmt, fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Flag to track if logging has been initialized (prevents double-init)
static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Default log level when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "dydx_v3=info";

/// Field names that must never be logged in clear.
///
/// Wrap such values with `SanitizedValue::new()` or `sanitize_signature()`
/// and add them to `skip(...)` in `#[instrument]`.
pub const SENSITIVE_FIELD_PATTERNS: &[&str] = &[
    "private_key",
    "stark_private_key",
    "secret",
    "passphrase",
    "signature",
];

/// Wrapper for sensitive data that should be redacted in logs.
///
/// Shows the first 4 characters of values longer than 8 characters, and
/// nothing of shorter ones.
#[derive(Clone)]
pub struct SanitizedValue<'a>(&'a str);

impl<'a> SanitizedValue<'a> {
    pub fn new(value: &'a str) -> Self {
        Self(value)
    }

    /// The wrapped value. Never pass the result to a logging macro.
    pub fn expose(&self) -> &str {
        self.0
    }
}

impl fmt::Display for SanitizedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() > 8 && self.0.is_char_boundary(4) {
            write!(f, "{}...REDACTED", &self.0[..4])
        } else {
            write!(f, "REDACTED")
        }
    }
}

impl fmt::Debug for SanitizedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SanitizedValue(***)")
    }
}

/// Shorthand for `SanitizedValue::new(value)`
pub fn sanitize(value: &str) -> SanitizedValue<'_> {
    SanitizedValue::new(value)
}

/// Show only the first 8 characters of a signature.
pub fn sanitize_signature(sig: &str) -> String {
    if sig.len() > 12 && sig.is_char_boundary(8) {
        format!("{}...", &sig[..8])
    } else {
        "REDACTED".to_string()
    }
}

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter string (e.g., "dydx_v3=debug")
    pub level_filter: String,
    /// Use pretty format instead of JSON
    pub use_pretty_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level_filter: DEFAULT_LOG_LEVEL.to_string(),
            use_pretty_format: false,
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG` and `LOG_FORMAT`
    pub fn from_env() -> Self {
        let level_filter = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let use_pretty_format = env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "pretty")
            .unwrap_or(false);

        Self {
            level_filter,
            use_pretty_format,
        }
    }
}

/// Initialize logging from the environment. Subsequent calls are no-ops.
pub fn init_logging() {
    init_logging_with_config(LoggingConfig::from_env());
}

/// Initialize logging with a specific configuration.
pub fn init_logging_with_config(config: LoggingConfig) {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let env_filter = EnvFilter::try_new(&config.level_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if config.use_pretty_format {
        tracing_subscriber::registry()
            .with(
                ts_fmt::layer()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                ts_fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_current_span(true),
            )
            .with(env_filter)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_sanitized_value_long_string() {
        let secret = "ErdvqOj_YSt61LRA_71z4xcZPS29p3DWfl_KBxRb";
        assert_eq!(format!("{}", SanitizedValue::new(secret)), "Erdv...REDACTED");
    }

    #[test]
    fn test_sanitized_value_short_string() {
        assert_eq!(format!("{}", SanitizedValue::new("abc")), "REDACTED");
        assert_eq!(format!("{}", SanitizedValue::new("")), "REDACTED");
        assert_eq!(format!("{}", SanitizedValue::new("12345678")), "REDACTED");
    }

    #[test]
    fn test_sanitized_value_debug() {
        let sanitized = SanitizedValue::new("491trEHGp4uJ4bZ-c75R");
        assert_eq!(format!("{:?}", sanitized), "SanitizedValue(***)");
        assert_eq!(sanitized.expose(), "491trEHGp4uJ4bZ-c75R");
    }

    #[test]
    fn test_sanitize_function() {
        assert_eq!(format!("{}", sanitize("my-secret-token-12345")), "my-s...REDACTED");
    }

    #[test]
    fn test_sanitize_signature() {
        assert_eq!(
            sanitize_signature("0x1234567890abcdef1234567890abcdef"),
            "0x123456..."
        );
        assert_eq!(sanitize_signature("short"), "REDACTED");
        assert_eq!(sanitize_signature(""), "REDACTED");
    }

    #[test]
    fn test_sensitive_field_patterns_contains_expected() {
        assert!(SENSITIVE_FIELD_PATTERNS.contains(&"secret"));
        assert!(SENSITIVE_FIELD_PATTERNS.contains(&"passphrase"));
        assert!(SENSITIVE_FIELD_PATTERNS.contains(&"private_key"));
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level_filter, DEFAULT_LOG_LEVEL);
        assert!(!config.use_pretty_format);
    }

    #[test]
    #[serial(env)]
    fn test_logging_config_from_env() {
        env::set_var("LOG_FORMAT", "PRETTY");
        env::set_var("RUST_LOG", "dydx_v3=debug");
        let config = LoggingConfig::from_env();
        assert!(config.use_pretty_format);
        assert_eq!(config.level_filter, "dydx_v3=debug");
        env::remove_var("LOG_FORMAT");
        env::remove_var("RUST_LOG");
    }
}
