//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::storage::ConfigError;
use crate::domain::ports::{CacheLimits, DEFAULT_MAX_COST_BYTES, DEFAULT_MAX_ENTRIES};
use crate::infrastructure::image::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

pub(super) const APP_NAME: &str = "imgcache";
pub(super) const APP_QUALIFIER: &str = "com";
pub(super) const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from TOML and overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path. Logs go to stderr when unset.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Memory cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Network fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Memory cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached images.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Maximum aggregate size of cached images in bytes.
    #[serde(default = "default_max_cost_bytes")]
    pub max_cost_bytes: u64,

    /// Share one download between concurrent requests for the same key.
    #[serde(default = "default_true")]
    pub coalesce_in_flight: bool,
}

impl CacheConfig {
    /// Returns the cache limits.
    #[must_use]
    pub fn limits(&self) -> CacheLimits {
        CacheLimits::new(self.max_entries, self.max_cost_bytes)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_cost_bytes: default_max_cost_bytes(),
            coalesce_in_flight: true,
        }
    }
}

/// Network fetch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent header sent with each request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl FetchConfig {
    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

const fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

const fn default_max_cost_bytes() -> u64 {
    DEFAULT_MAX_COST_BYTES
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

const fn default_true() -> bool {
    true
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(max_entries) = args.max_entries {
            self.cache.max_entries = max_entries;
        }
        if let Some(max_cost_bytes) = args.max_cost_bytes {
            self.cache.max_cost_bytes = max_cost_bytes;
        }
        if let Some(coalesce) = args.coalesce {
            self.cache.coalesce_in_flight = coalesce;
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.fetch.timeout_secs = timeout_secs;
        }
        if let Some(user_agent) = &args.user_agent {
            self.fetch.user_agent.clone_from(user_agent);
        }
    }

    /// Checks that every limit is usable.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.max_entries == 0 {
            return Err(ConfigError::invalid("cache.max_entries", "must be at least 1"));
        }
        if self.cache.max_cost_bytes == 0 {
            return Err(ConfigError::invalid(
                "cache.max_cost_bytes",
                "must be at least 1",
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::invalid("fetch.timeout_secs", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LogLevel::Info,
            cache: CacheConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
            log_level = "debug"

            [cache]
            max_entries = 25
            coalesce_in_flight = false

            [fetch]
            timeout_secs = 5
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.cache.max_entries, 25);
        assert_eq!(config.cache.max_cost_bytes, 104_857_600);
        assert!(!config.cache.coalesce_in_flight);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(5));
        assert_eq!(config.fetch.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.cache.limits(), CacheLimits::default());
        assert!(config.cache.coalesce_in_flight);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_args_override_file() {
        let mut config = AppConfig::default();
        let args = CliArgs::parse_from([
            "imgcache",
            "--max-entries",
            "3",
            "--max-cost-bytes",
            "4096",
            "--coalesce",
            "false",
            "--log-level",
            "warn",
            "https://example.com/a.png",
        ]);

        config.merge_with_args(&args);

        assert_eq!(config.cache.limits(), CacheLimits::new(3, 4096));
        assert!(!config.cache.coalesce_in_flight);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.fetch.timeout_secs, 30);
    }

    #[test]
    fn test_zero_limits_are_invalid() {
        let mut config = AppConfig::default();
        config.cache.max_entries = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "cache.max_entries", .. })
        ));

        let mut config = AppConfig::default();
        config.cache.max_cost_bytes = 0;
        assert!(config.validate().is_err());
    }
}
