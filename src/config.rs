//! Collector configuration.
//!
//! The configuration is built once at startup and passed by reference to
//! the collector. It understands collectd-style `Key Value` lines, so the
//! block a host daemon hands to the plugin can be used verbatim:
//!
//! ```text
//! <Plugin bcache>
//!     Verbose true
//! </Plugin>
//! ```

use std::path::Path;

use tracing::warn;

/// Error type for configuration failures.
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    Io(std::io::Error),
    /// A key was given without a value.
    MissingValue { key: String },
    /// A boolean option had a value that is not a boolean.
    InvalidBool { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::MissingValue { key } => write!(f, "missing value for {}", key),
            ConfigError::InvalidBool { key, value } => {
                write!(f, "invalid boolean '{}' for {}", value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// Runtime options of the bcache collector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Logs every emitted sample at info level.
    pub verbose: bool,
}

impl Config {
    /// Applies one option.
    ///
    /// Returns `Ok(false)` for keys this collector does not know.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        if key.eq_ignore_ascii_case("Verbose") {
            if value.is_empty() {
                return Err(ConfigError::MissingValue {
                    key: key.to_string(),
                });
            }
            self.verbose = parse_bool(value).ok_or_else(|| ConfigError::InvalidBool {
                key: key.to_string(),
                value: value.to_string(),
            })?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Builds a configuration from `(key, value)` pairs.
    ///
    /// Unknown keys are reported as warnings and otherwise ignored.
    pub fn from_options<'a>(
        options: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for (key, value) in options {
            if !config.apply(key, value)? {
                warn!("bcache plugin: Unknown config key: {}", key);
            }
        }
        Ok(config)
    }

    /// Parses a collectd-style configuration block.
    ///
    /// Blank lines, `#` comments and `<...>` section lines are skipped.
    /// A key without a value is passed on with an empty value.
    pub fn from_collectd_block(content: &str) -> Result<Self, ConfigError> {
        let mut options = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('<') {
                continue;
            }

            let (key, value) = match line.split_once(char::is_whitespace) {
                Some((key, value)) => (key, value.trim()),
                None => (line, ""),
            };
            options.push((key, value.trim_matches('"')));
        }
        Self::from_options(options)
    }

    /// Loads a configuration file in the collectd block format.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_collectd_block(&content)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
