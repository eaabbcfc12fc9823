//! CLI configuration

use std::path::Path;

use nearby_core::NearbyConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Settings for the two-device demo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Message the publisher broadcasts
    pub message: String,
    /// How long to listen for events after each step
    pub linger_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            message: "hello from nearby".to_string(),
            linger_ms: 200,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_key: String,
    pub runtime: NearbyConfig,
    pub demo: DemoConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: "demo-api-key".to_string(),
            runtime: NearbyConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file; missing keys take defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(CliError::Config("api_key must not be empty".to_string()));
        }
        self.runtime.validate()?;
        Ok(())
    }
}
