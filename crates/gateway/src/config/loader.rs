use std::path::Path;
use thiserror::Error;

use super::types::GatewayConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load gateway configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GatewayConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<GatewayConfig, ConfigError> {
    let default_config = include_str!("default_config.json");
    load_config_from_str(default_config)
}

impl GatewayConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.host.trim().is_empty() {
            return Err(ConfigError::Invalid("connection.host is empty".to_string()));
        }
        if self.connection.port == 0 {
            return Err(ConfigError::Invalid("connection.port is 0".to_string()));
        }
        if self.correlation.response_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "correlation.response_timeout_ms is 0".to_string(),
            ));
        }
        if self.correlation.window_length == 0 {
            return Err(ConfigError::Invalid(
                "correlation.window_length is 0".to_string(),
            ));
        }
        Ok(())
    }
}
