//! Runtime configuration parsed from environment variables.

use tracing::Level;

pub const DEFAULT_LOG_LEVEL: Level = Level::INFO;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid SHELF_LOG level '{0}' (expected error, warn, info, debug or trace)")]
    InvalidLogLevel(String),
    #[error("invalid SHELF_OUTPUT '{0}' (expected 'pretty' or 'compact')")]
    InvalidOutput(String),
}

/// How the final template is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfConfig {
    pub log_level: Level,
    pub output: OutputFormat,
}

impl ShelfConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `SHELF_LOG`: `error`, `warn`, `info` (default), `debug` or `trace`
    /// - `SHELF_OUTPUT`: `pretty` (default) or `compact`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let log_level = parse_log_level(lookup("SHELF_LOG").as_deref())?;
        let output = parse_output(lookup("SHELF_OUTPUT").as_deref())?;
        Ok(Self { log_level, output })
    }

    /// Apply command-line overrides on top of the environment.
    #[must_use]
    pub fn with_overrides(mut self, log_level: Option<Level>, compact: bool) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        if compact {
            self.output = OutputFormat::Compact;
        }
        self
    }
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self { log_level: DEFAULT_LOG_LEVEL, output: OutputFormat::default() }
    }
}

pub fn parse_log_level(raw: Option<&str>) -> Result<Level, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_LOG_LEVEL),
        Some(value) => value
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(value.to_string())),
    }
}

fn parse_output(raw: Option<&str>) -> Result<OutputFormat, ConfigError> {
    match raw.unwrap_or("pretty") {
        "pretty" => Ok(OutputFormat::Pretty),
        "compact" => Ok(OutputFormat::Compact),
        other => Err(ConfigError::InvalidOutput(other.to_string())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
