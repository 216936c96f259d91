//! Configuration management for the Air Quality Intelligence service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with AQI_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{MissingFeaturePolicy, NormalizationPolicy, PollutantLevels};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Air pollution API configuration
    pub pollution: PollutionConfig,

    /// Prediction model configuration
    pub model: ModelConfig,

    /// Feature normalization policy
    pub normalization: NormalizationConfig,

    /// Values used for manual predictions when a pollutant is left unset
    pub manual_defaults: ManualDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollutionConfig {
    /// Air pollution API base URL
    pub api_endpoint: String,

    /// Air pollution API key; city analysis is disabled when empty
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Path to the JSON model artifact
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NormalizationConfig {
    /// Fill missing features with `default_value` instead of failing
    pub fill_missing: bool,

    pub default_value: f64,

    /// Reject negative and non-finite concentrations
    pub validate_readings: bool,

    /// Accept model features that match no known pollutant
    pub allow_unmapped_features: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ManualDefaults {
    pub so2: f64,
    pub no2: f64,
    pub pm10: f64,
    pub pm25: f64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("AQI_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("pollution.api_endpoint", "http://api.openweathermap.org/data/2.5")?
            .set_default("pollution.api_key", "")?
            .set_default("pollution.timeout_secs", 10)?
            .set_default("model.path", "models/aqi_model.json")?
            .set_default("normalization.fill_missing", true)?
            .set_default("normalization.default_value", 0.0)?
            .set_default("normalization.validate_readings", true)?
            .set_default("normalization.allow_unmapped_features", true)?
            .set_default("manual_defaults.so2", 10.0)?
            .set_default("manual_defaults.no2", 20.0)?
            .set_default("manual_defaults.pm10", 50.0)?
            .set_default("manual_defaults.pm25", 30.0)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AQI_ prefix)
            .add_source(
                Environment::with_prefix("AQI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl NormalizationConfig {
    pub fn policy(&self) -> NormalizationPolicy {
        NormalizationPolicy {
            missing: if self.fill_missing {
                MissingFeaturePolicy::FillDefault(self.default_value)
            } else {
                MissingFeaturePolicy::Reject
            },
            validate_readings: self.validate_readings,
            allow_unmapped_features: self.allow_unmapped_features,
        }
    }
}

impl ManualDefaults {
    pub fn levels(&self) -> PollutantLevels {
        PollutantLevels {
            so2: self.so2,
            no2: self.no2,
            pm10: self.pm10,
            pm25: self.pm25,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            pollution: PollutionConfig::default(),
            model: ModelConfig::default(),
            normalization: NormalizationConfig::default(),
            manual_defaults: ManualDefaults::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for PollutionConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "http://api.openweathermap.org/data/2.5".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "models/aqi_model.json".to_string(),
        }
    }
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            fill_missing: true,
            default_value: 0.0,
            validate_readings: true,
            allow_unmapped_features: true,
        }
    }
}

impl Default for ManualDefaults {
    fn default() -> Self {
        Self {
            so2: 10.0,
            no2: 20.0,
            pm10: 50.0,
            pm25: 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_normalization_is_interactive() {
        assert_eq!(
            NormalizationConfig::default().policy(),
            NormalizationPolicy::interactive()
        );
    }

    #[test]
    fn test_reject_missing_policy() {
        let config = NormalizationConfig {
            fill_missing: false,
            ..NormalizationConfig::default()
        };
        assert_eq!(config.policy().missing, MissingFeaturePolicy::Reject);
    }
}
