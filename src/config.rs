//! Configuration management for the Elvia coordinator
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files with support for environment variable overrides.

use crate::error::{ElviaError, Result};
use crate::logging::parse_log_level;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Elvia API access and metering point selection
    pub elvia: ElviaConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Polling interval in milliseconds; the hourly gate decides whether a
    /// tick actually fetches
    pub poll_interval_ms: u64,

    /// Timezone used for the hourly gate and the price lookup
    pub timezone: String,
}

/// Elvia API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElviaConfig {
    /// Metering point id (MPID) tracked by this instance
    pub metering_point_id: String,

    /// Subscription key for the grid tariff API
    pub api_key: String,

    /// Bearer token for the meter values API
    pub access_token: String,

    /// Base URL of the grid tariff API
    pub grid_tariff_url: String,

    /// Base URL of the meter values API
    pub meter_values_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Tariff plan metadata captured at setup
    pub tariff_type: TariffTypeConfig,
}

/// Tariff plan metadata as stored by the setup flow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TariffTypeConfig {
    pub title: String,
    pub company_name: String,
    pub tariff_key: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Default for ElviaConfig {
    fn default() -> Self {
        Self {
            metering_point_id: String::new(),
            api_key: String::new(),
            access_token: String::new(),
            grid_tariff_url: "https://elvia.azure-api.net/grid-tariff".to_string(),
            meter_values_url: "https://elvia.azure-api.net/customer/metervalues".to_string(),
            timeout_secs: 10,
            tariff_type: TariffTypeConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/elvia.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            elvia: ElviaConfig::default(),
            logging: LoggingConfig::default(),
            poll_interval_ms: 60_000,
            timezone: "Europe/Oslo".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        let default_paths = [
            "elvia_config.yaml",
            "/data/elvia_config.yaml",
            "/etc/elvia/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Overlay secrets and the metering point id from the environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    pub(crate) fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty("ELVIA_METERING_POINT_ID") {
            self.elvia.metering_point_id = v;
        }
        if let Some(v) = non_empty("ELVIA_API_KEY") {
            self.elvia.api_key = v;
        }
        if let Some(v) = non_empty("ELVIA_ACCESS_TOKEN") {
            self.elvia.access_token = v;
        }
    }

    /// Parsed timezone
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        Ok(self.timezone.parse::<chrono_tz::Tz>()?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.elvia.metering_point_id.trim().is_empty() {
            return Err(ElviaError::validation(
                "elvia.metering_point_id",
                "Metering point id cannot be empty",
            ));
        }

        if self.elvia.timeout_secs == 0 {
            return Err(ElviaError::validation(
                "elvia.timeout_secs",
                "Must be greater than 0",
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(ElviaError::validation(
                "poll_interval_ms",
                "Must be greater than 0",
            ));
        }

        self.tz()?;

        parse_log_level(&self.logging.level)
            .map_err(|e| ElviaError::validation("logging.level", e.to_string()))?;

        Ok(())
    }
}
