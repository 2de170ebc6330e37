use crate::constants::{
    is_valid_port, is_valid_timeout, DEFAULT_DNS_PORT, DEFAULT_TIMEOUT, DEFAULT_TRANSACTION_ID,
    MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS,
};
use crate::query::TransactionId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub timeout_secs: Option<u64>,
    pub port: Option<u16>,
    pub transaction_id: Option<u16>,
    pub random_id: Option<bool>,
    pub color: Option<bool>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds to wait for a reply
    pub timeout_secs: u64,
    /// Destination port
    pub port: u16,
    /// Transaction ID used when `random_id` is off
    pub transaction_id: u16,
    /// Randomize the transaction ID of every query
    pub random_id: bool,
    /// Colored console output
    pub color: bool,
    /// Log level
    pub log_level: String,
    /// Optional log file path
    pub log_file: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            port: DEFAULT_DNS_PORT,
            transaction_id: DEFAULT_TRANSACTION_ID,
            random_id: false,
            color: true,
            log_level: "warn".to_string(),
            log_file: None,
        }
    }

    /// Load configuration from a TOML file, layered over the defaults
    pub fn load_from_file(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file not found: {}",
                config_path.display()
            ));
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config_file: ConfigFile = toml::from_str(&config_content)
            .with_context(|| "Failed to parse config file as TOML")?;

        let mut config = Self::new();
        config.apply_file(config_file);

        info!("Configuration loaded from: {}", config_path.display());
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(timeout_secs) = file.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(transaction_id) = file.transaction_id {
            self.transaction_id = transaction_id;
        }
        if let Some(random_id) = file.random_id {
            self.random_id = random_id;
        }
        if let Some(color) = file.color {
            self.color = color;
        }
        if let Some(log_level) = file.log_level {
            self.log_level = log_level;
        }
        if let Some(log_file) = file.log_file {
            self.log_file = Some(log_file);
        }
    }

    /// Candidate locations searched by `try_load_default`, in order
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("./verbind.toml"),
            PathBuf::from("./config/verbind.toml"),
        ];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".verbind").join("verbind.toml"));
        }
        paths.push(PathBuf::from("/etc/verbind/verbind.toml"));
        paths
    }

    /// Load the first configuration file found in the default locations
    pub fn try_load_default() -> Result<Self> {
        for path in Self::default_paths() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::new())
    }

    /// Save the configuration to a file
    pub fn save_to_file(&self, config_path: impl AsRef<Path>) -> Result<()> {
        let config_path = config_path.as_ref();

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let config_file = ConfigFile {
            timeout_secs: Some(self.timeout_secs),
            port: Some(self.port),
            transaction_id: Some(self.transaction_id),
            random_id: Some(self.random_id),
            color: Some(self.color),
            log_level: Some(self.log_level.clone()),
            log_file: self.log_file.clone(),
        };

        let toml_content = toml::to_string_pretty(&config_file)
            .with_context(|| "Failed to serialize config to TOML")?;

        fs::write(config_path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        info!("Configuration saved to: {}", config_path.display());
        Ok(())
    }

    pub fn create_default_config(config_path: impl AsRef<Path>) -> Result<()> {
        Self::new().save_to_file(config_path)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_timeout(self.timeout_secs) {
            return Err(anyhow::anyhow!(
                "Invalid timeout: {}s (must be between {} and {})",
                self.timeout_secs,
                MIN_TIMEOUT_SECS,
                MAX_TIMEOUT_SECS
            ));
        }

        if !is_valid_port(self.port) {
            return Err(anyhow::anyhow!("Invalid port: {}", self.port));
        }

        if self.log_level.trim().is_empty() {
            return Err(anyhow::anyhow!("Log level must not be empty"));
        }

        if self.random_id && self.transaction_id != DEFAULT_TRANSACTION_ID {
            warn!(
                "transaction_id {:#06x} is ignored while random_id is enabled",
                self.transaction_id
            );
        }

        Ok(())
    }

    /// Log the effective settings
    pub fn display(&self) {
        info!("Configuration:");
        info!("  Timeout: {}s", self.timeout_secs);
        info!("  Port: {}", self.port);
        if self.random_id {
            info!("  Transaction ID: random");
        } else {
            info!("  Transaction ID: {:#06x}", self.transaction_id);
        }
        info!("  Color: {}", self.color);
        info!("  Log Level: {}", self.log_level);
        if let Some(ref log_file) = self.log_file {
            info!("  Log File: {}", log_file);
        }
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(timeout_secs) = cli.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(random_id) = cli.random_id {
            self.random_id = random_id;
        }
        if let Some(color) = cli.color {
            self.color = color;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = log_level.clone();
        }
        if let Some(log_file) = &cli.log_file {
            self.log_file = Some(log_file.clone());
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn transaction_id(&self) -> TransactionId {
        if self.random_id {
            TransactionId::Random
        } else {
            TransactionId::Fixed(self.transaction_id)
        }
    }
}

/// Command line overrides structure
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub timeout_secs: Option<u64>,
    pub port: Option<u16>,
    pub random_id: Option<bool>,
    pub color: Option<bool>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn test_config_creation() {
        let config = Config::new();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.port, 53);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.transaction_id(), TransactionId::Fixed(0xC0DE));
        assert!(config.color);
    }

    #[test]
    fn test_config_validation() {
        let config = Config::new();
        assert!(config.validate().is_ok());

        let mut invalid_config = Config::new();
        invalid_config.timeout_secs = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = Config::new();
        invalid_config.timeout_secs = MAX_TIMEOUT_SECS + 1;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = Config::new();
        invalid_config.port = 0;
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("nested").join("verbind.toml");

        Config::create_default_config(&config_path)?;
        assert!(config_path.exists());

        let loaded_config = Config::load_from_file(&config_path)?;
        assert_eq!(loaded_config.port, 53);

        let mut modified_config = loaded_config;
        modified_config.timeout_secs = 2;
        modified_config.random_id = true;
        modified_config.save_to_file(&config_path)?;

        let reloaded_config = Config::load_from_file(&config_path)?;
        assert_eq!(reloaded_config.timeout_secs, 2);
        assert_eq!(reloaded_config.transaction_id(), TransactionId::Random);

        Ok(())
    }

    #[test]
    fn test_partial_config_file() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("verbind.toml");
        fs::write(&config_path, "port = 5353\ncolor = false\n")?;

        let config = Config::load_from_file(&config_path)?;
        assert_eq!(config.port, 5353);
        assert!(!config.color);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.log_level, "warn");

        Ok(())
    }

    #[test]
    fn test_missing_and_malformed_files() -> Result<()> {
        let temp_dir = tempdir()?;
        assert!(Config::load_from_file(temp_dir.path().join("absent.toml")).is_err());

        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "port = \"fifty-three\"")?;
        assert!(Config::load_from_file(&config_path).is_err());

        Ok(())
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::new();
        let overrides = CliOverrides {
            timeout_secs: Some(1),
            port: Some(5353),
            color: Some(false),
            ..Default::default()
        };

        config.apply_cli_overrides(&overrides);
        assert_eq!(config.timeout_secs, 1);
        assert_eq!(config.port, 5353);
        assert!(!config.color);
        assert!(!config.random_id);
    }
}
