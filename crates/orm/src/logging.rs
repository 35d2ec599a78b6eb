//! Structured logging setup
//!
//! The ORM itself only emits `tracing` events: every statement at `debug`,
//! failures at `warn` or `error`. Binaries embedding it can install a
//! subscriber here.

use std::io;

use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Fallback level when no filter is given, e.g. "info"
    pub level: String,
    /// Emit one JSON object per event instead of plain text
    pub json_format: bool,
    /// Include file and line number information
    pub include_location: bool,
    /// Filter directives such as "mate_orm=debug,sqlx=warn"
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json_format: true,
            include_location: false,
            env_filter: Some("mate_orm=info,sqlx=warn".to_string()),
        }
    }

    /// Every statement the ORM runs, with source locations
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            include_location: true,
            env_filter: Some("mate_orm=debug,sqlx=info".to_string()),
        }
    }

    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            json_format: false,
            include_location: false,
            env_filter: Some("mate_orm=error".to_string()),
        }
    }

    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn directives(&self) -> &str {
        self.env_filter.as_deref().unwrap_or(&self.level)
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the configured filter
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.directives()))?;

    let layer = Layer::new()
        .with_writer(io::stdout)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()?;
    }

    tracing::info!(
        target: "mate_orm::logging",
        "logging initialized (level: {}, format: {})",
        config.level,
        if config.json_format { "json" } else { "text" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(LoggingConfig::production().json_format);
        assert!(LoggingConfig::development().include_location);
        assert_eq!(LoggingConfig::test().directives(), "mate_orm=error");
        assert_eq!(LoggingConfig::default().directives(), "info");
    }

    #[test]
    fn test_custom_filter_wins_over_level() {
        let config = LoggingConfig::default().with_env_filter("mate_orm=trace");
        assert_eq!(config.directives(), "mate_orm=trace");
    }

    #[test]
    fn test_second_init_is_an_error() {
        let config = LoggingConfig::test();
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}
