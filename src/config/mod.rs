//! Configuration management for specomp
//!
//! This module handles loading, parsing, and managing configuration from various sources:
//! - Configuration files (TOML format)
//! - Environment variables
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::{ConfigError, Result};

/// Prefix of environment variables that override file values
pub const ENV_PREFIX: &str = "SPECOMP_";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Generator execution configuration
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Ranking configuration
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generator execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Wait limit for generators that do not declare their own, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Lifetime of cached generator output, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Shell used to run generator commands
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Environment variables folded into every cache key
    #[serde(default)]
    pub cache_env: Vec<String>,
}

/// Ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Maximum number of candidates emitted (0 for no limit)
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Display and output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Output format (text, json, table)
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One candidate per line, description dimmed
    Text,

    /// JSON array of candidate objects
    Json,

    /// Table with value, description, kind and priority columns
    Table,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_timeout_ms() -> u64 {
    5000
}

fn default_cache_ttl_secs() -> u64 {
    30
}

fn default_shell() -> String {
    "sh".to_string()
}

fn default_max_results() -> usize {
    100
}

fn default_format() -> OutputFormat {
    OutputFormat::Text
}

fn default_color_output() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    false
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            shell: default_shell(),
            cache_env: Vec::new(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            color_output: default_color_output(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        let config: Config =
            toml::from_str(&text).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from file and environment with proper precedence
    ///
    /// An explicit `path` must exist; without one the default location is
    /// tried and silently skipped when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_from(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SPECOMP_*` overrides
    ///
    /// Example: SPECOMP_GENERATOR_TIMEOUT_MS=250
    pub fn apply_env_from<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(field) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match field {
                "GENERATOR_TIMEOUT_MS" => self.generator.timeout_ms = parse_env(&name, &value)?,
                "GENERATOR_CACHE_TTL_SECS" => {
                    self.generator.cache_ttl_secs = parse_env(&name, &value)?
                }
                "GENERATOR_SHELL" => self.generator.shell = value,
                "GENERATOR_CACHE_ENV" => {
                    self.generator.cache_env = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                }
                "RANKING_MAX_RESULTS" => self.ranking.max_results = parse_env(&name, &value)?,
                "DISPLAY_FORMAT" => self.display.format = parse_enum(&name, &value)?,
                "DISPLAY_COLOR_OUTPUT" => self.display.color_output = parse_env(&name, &value)?,
                "LOGGING_LEVEL" => self.logging.level = parse_enum(&name, &value)?,
                "LOGGING_TIMESTAMPS" => self.logging.timestamps = parse_env(&name, &value)?,
                _ => debug!("Ignoring unknown variable {}", name),
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".specomp")
            .join("config.toml")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.generator.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generator.timeout_ms".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.generator.shell.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "generator.shell".to_string(),
                value: self.generator.shell.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Get generator timeout as Duration
    pub fn generator_timeout(&self) -> Duration {
        Duration::from_millis(self.generator.timeout_ms)
    }

    /// Get cache TTL as Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.generator.cache_ttl_secs)
    }

    /// Result cap, `None` when unlimited
    pub fn max_results(&self) -> Option<usize> {
        match self.ranking.max_results {
            0 => None,
            n => Some(n),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::InvalidValue {
            field: name.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

/// Parse a lowercase enum name through its serde representation
fn parse_enum<T: serde::de::DeserializeOwned>(name: &str, value: &str) -> Result<T> {
    let quoted = serde_json::Value::String(value.trim().to_lowercase());
    serde_json::from_value(quoted).map_err(|_| {
        ConfigError::InvalidValue {
            field: name.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpecompError;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generator.timeout_ms, 5000);
        assert_eq!(config.generator.shell, "sh");
        assert_eq!(config.display.format, OutputFormat::Text);
        assert!(config.display.color_output);
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.max_results(), Some(100));
    }

    #[test]
    fn test_from_file_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[generator]\ntimeout_ms = 250\ncache_env = [\"JAVA_HOME\"]\n\n[display]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.generator.timeout_ms, 250);
        assert_eq!(config.generator.cache_env, vec!["JAVA_HOME"]);
        assert_eq!(config.generator.cache_ttl_secs, 30);
        assert_eq!(config.display.format, OutputFormat::Json);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(
            err,
            SpecompError::Config(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[generator\ntimeout_ms = ").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(
            err,
            SpecompError::Config(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_from(vars(&[
                ("SPECOMP_GENERATOR_TIMEOUT_MS", "750"),
                ("SPECOMP_GENERATOR_CACHE_ENV", "JAVA_HOME, PATH"),
                ("SPECOMP_DISPLAY_FORMAT", "Table"),
                ("SPECOMP_LOGGING_LEVEL", "debug"),
                ("SPECOMP_RANKING_MAX_RESULTS", "0"),
                ("HOME", "/root"),
            ]))
            .unwrap();

        assert_eq!(config.generator.timeout_ms, 750);
        assert_eq!(config.generator.cache_env, vec!["JAVA_HOME", "PATH"]);
        assert_eq!(config.display.format, OutputFormat::Table);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.max_results(), None);
    }

    #[test]
    fn test_env_invalid_value() {
        let mut config = Config::default();
        let err = config
            .apply_env_from(vars(&[("SPECOMP_GENERATOR_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("SPECOMP_GENERATOR_TIMEOUT_MS"));

        let err = config
            .apply_env_from(vars(&[("SPECOMP_DISPLAY_FORMAT", "yaml")]))
            .unwrap_err();
        assert!(matches!(
            err,
            SpecompError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.generator.timeout_ms = 0;
        assert!(config.validate().is_err());

        config.generator.timeout_ms = 10;
        config.generator.shell = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
