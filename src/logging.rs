//! Structured logging setup.
//!
//! Every module logs through `tracing` macros with structured fields; this
//! module only installs a subscriber. Libraries embedding the router can skip
//! it entirely and install their own.
//!
//! Environment variables read by [`LogConfig::from_env`]:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `SWITCHYARD_LOG_LEVEL` | `info` | trace/debug/info/warn/error |
//! | `SWITCHYARD_LOG_FORMAT` | `json` | json/pretty |
//! | `SWITCHYARD_LOG_FILTER` | unset | extra comma-separated filter directives |
//! | `SWITCHYARD_LOG_INCLUDE_LOCATION` | `false` | add file and line to events |
//!
//! `RUST_LOG`, when set, replaces the level.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Extra filter directives (comma-separated), e.g. `switchyard::mount=debug`
    pub target_filter: Option<String>,
    /// Include file:line location (dev only)
    pub include_location: bool,
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            log_level: lookup("SWITCHYARD_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            format: LogFormat::parse(
                &lookup("SWITCHYARD_LOG_FORMAT").unwrap_or_else(|| "json".to_string()),
            ),
            target_filter: lookup("SWITCHYARD_LOG_FILTER"),
            include_location: lookup("SWITCHYARD_LOG_INCLUDE_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Configuration for local development and tests
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let mut env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',') {
                let filter = filter.trim();
                if filter.is_empty() {
                    continue;
                }
                match filter.parse() {
                    Ok(directive) => env_filter = env_filter.add_directive(directive),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {filter}"),
                }
            }
        }
        env_filter
    }
}

/// Install a global subscriber configured from the environment.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LogConfig::from_env())
}

/// Install a global subscriber for `config`.
///
/// ```no_run
/// use switchyard::logging::{init_logging_with_config, LogConfig};
///
/// init_logging_with_config(&LogConfig::default_dev()).expect("logging");
/// ```
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_span_list(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Json);
    }

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::from_lookup(|_| None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.target_filter.is_none());
        assert!(!config.include_location);
    }

    #[test]
    fn test_log_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("SWITCHYARD_LOG_LEVEL", "debug"),
            ("SWITCHYARD_LOG_FORMAT", "pretty"),
            ("SWITCHYARD_LOG_FILTER", "switchyard::mount=trace"),
            ("SWITCHYARD_LOG_INCLUDE_LOCATION", "true"),
        ]
        .into_iter()
        .collect();
        let config = LogConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.target_filter.as_deref(), Some("switchyard::mount=trace"));
        assert!(config.include_location);
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let config = LogConfig {
            log_level: "loud".to_string(),
            ..LogConfig::default_dev()
        };
        assert_eq!(config.level(), Level::INFO);
    }
}
