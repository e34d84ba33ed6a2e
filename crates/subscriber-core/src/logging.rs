//! Logging setup for hosts that have not installed a tracing subscriber
//!
//! The crate itself only emits `tracing` events. Applications that want a
//! ready-made formatter call [`setup_logging`] once at startup; `RUST_LOG`
//! directives are honored on top of the configured level.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{SubscriberError, SubscriberResult};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    /// JSON lines on stdout instead of human-readable text
    pub json: bool,
    pub file_info: bool,
    /// Log span open/close, useful to follow a single subscription
    pub log_spans: bool,
    pub app_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: Level::INFO,
            json: false,
            file_info: false,
            log_spans: false,
            app_name: "subscriber-core".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn new(level: Level, app_name: impl Into<String>) -> Self {
        LoggingConfig {
            level,
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn with_file_info(mut self) -> Self {
        self.file_info = true;
        self
    }

    pub fn with_spans(mut self) -> Self {
        self.log_spans = true;
        self
    }
}

/// Install a global fmt subscriber. Fails if one is already installed.
pub fn setup_logging(config: LoggingConfig) -> SubscriberResult<()> {
    let filter = EnvFilter::from_default_env().add_directive(config.level.into());

    let span_events = if config.log_spans {
        FmtSpan::ACTIVE
    } else {
        FmtSpan::NONE
    };

    let mut subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(span_events);

    if config.file_info {
        subscriber = subscriber.with_file(true).with_line_number(true);
    }

    let installed = if config.json {
        subscriber.with_writer(std::io::stdout).json().try_init()
    } else {
        subscriber.try_init()
    };
    installed.map_err(|e| SubscriberError::invalid_configuration("logging", e.to_string()))?;

    tracing::info!(app = %config.app_name, version = crate::VERSION, "logging initialized");
    Ok(())
}

pub fn parse_log_level(level: &str) -> SubscriberResult<Level> {
    Level::from_str(level)
        .map_err(|_| SubscriberError::invalid_configuration("log_level", format!("Invalid log level: {}", level)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn builder_flags() {
        let config = LoggingConfig::new(Level::TRACE, "demo").with_json().with_spans();
        assert!(config.json);
        assert!(config.log_spans);
        assert!(!config.file_info);
        assert_eq!(config.app_name, "demo");
    }
}
