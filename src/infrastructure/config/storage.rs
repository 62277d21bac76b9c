use super::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, AppConfig};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    /// Creates invalid value error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Locates and reads the configuration file.
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new `ConfigLoader` rooted at the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration directory cannot be determined.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::ConfigDirNotFound)?;

        Ok(Self { config_dir })
    }

    /// Creates a new `ConfigLoader` with a specific directory (useful for testing).
    #[must_use]
    pub fn with_dir(path: PathBuf) -> Self {
        Self { config_dir: path }
    }

    /// Loads the application configuration.
    ///
    /// An explicit `path_override` is parsed strictly. Without one, a missing file in the
    /// config directory yields the defaults and a file that fails to parse is reported and
    /// replaced by the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the explicit file cannot be read or parsed, or if the
    /// default file exists but cannot be read.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
        if let Some(path) = path_override {
            let config = Self::parse_file(path)?;
            info!("Loaded configuration from {:?}", path);
            return Ok(config);
        }

        let config_path = self.config_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            debug!(
                "Config file not found at {:?}, using defaults.",
                config_path
            );
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&config_path)?;
        match toml::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}. Using defaults.", e);
                Ok(AppConfig::default())
            }
        }
    }

    /// Parses a configuration file strictly, surfacing parse errors.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn parse_file(path: &Path) -> Result<AppConfig, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let loader = ConfigLoader::with_dir(temp_dir.path().to_path_buf());

        let config = loader.load_config(None)?;

        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn test_loads_file_from_config_dir() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[cache]\nmax_entries = 7\n",
        )?;
        let loader = ConfigLoader::with_dir(temp_dir.path().to_path_buf());

        let config = loader.load_config(None)?;

        assert_eq!(config.cache.max_entries, 7);
        Ok(())
    }

    #[test]
    fn test_override_path_wins() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let custom = temp_dir.path().join("custom.toml");
        fs::write(&custom, "[fetch]\ntimeout_secs = 3\n")?;
        let loader = ConfigLoader::with_dir(temp_dir.path().join("unused"));

        let config = loader.load_config(Some(&custom))?;

        assert_eq!(config.fetch.timeout_secs, 3);
        Ok(())
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[cache\nmax_entries = ")?;
        let loader = ConfigLoader::with_dir(temp_dir.path().to_path_buf());

        assert_eq!(loader.load_config(None)?, AppConfig::default());
        assert!(matches!(
            ConfigLoader::parse_file(&path),
            Err(ConfigError::TomlDe(_))
        ));
        Ok(())
    }

    #[test]
    fn test_malformed_override_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let custom = temp_dir.path().join("custom.toml");
        fs::write(&custom, "[cache\nmax_entries = ")?;
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[cache]\nmax_entries = 7\n",
        )?;
        let loader = ConfigLoader::with_dir(temp_dir.path().to_path_buf());

        assert!(matches!(
            loader.load_config(Some(&custom)),
            Err(ConfigError::TomlDe(_))
        ));
        assert!(matches!(
            loader.load_config(Some(&temp_dir.path().join("missing.toml"))),
            Err(ConfigError::Io(_))
        ));
        Ok(())
    }
}
