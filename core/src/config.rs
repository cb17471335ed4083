//! Configuration handed to the core by the host at startup.
//!
//! The host ships it as JSON (from its resources or build config). Every
//! field except the API key has a default.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::location::LocationRequest;

pub const DEFAULT_GEOCODER_URL: &str = "https://maps.googleapis.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

fn default_base_url() -> String {
    DEFAULT_GEOCODER_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub location: LocationRequest,
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.geocoder.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.location.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}
