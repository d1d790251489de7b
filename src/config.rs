//! Configuration management for the `Skycast` dashboard core
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::DashboardError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `Skycast` dashboard core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Upstream API endpoints and HTTP settings
    #[serde(default)]
    pub network: NetworkConfig,
    /// Location resolution settings
    #[serde(default)]
    pub location: LocationConfig,
    /// Refresh lifecycle settings
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream API endpoints and HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Base URL for the forecast API
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,
    /// Base URL for the air quality API
    #[serde(default = "default_air_quality_base_url")]
    pub air_quality_base_url: String,
    /// Base URL for the geocoding API
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_network_timeout")]
    pub timeout_seconds: u32,
}

/// Location resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Primary IP geolocation endpoint
    #[serde(default = "default_ip_primary_url")]
    pub ip_primary_url: String,
    /// Secondary IP geolocation endpoint
    #[serde(default = "default_ip_secondary_url")]
    pub ip_secondary_url: String,
    /// Bounded wait for device geolocation in seconds
    #[serde(default = "default_device_timeout")]
    pub device_timeout_seconds: u32,
    /// Bounded wait per IP geolocation provider in seconds
    #[serde(default = "default_ip_timeout")]
    pub ip_timeout_seconds: u32,
}

/// Refresh lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Background refresh interval in seconds
    #[serde(default = "default_refresh_interval")]
    pub interval_seconds: u32,
    /// Whether to fetch air quality alongside the forecast
    #[serde(default = "default_include_air_quality")]
    pub include_air_quality: bool,
    /// Number of forecast days to request
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_air_quality_base_url() -> String {
    "https://air-quality-api.open-meteo.com/v1".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_network_timeout() -> u32 {
    30
}

fn default_ip_primary_url() -> String {
    "https://ipapi.co/json/".to_string()
}

fn default_ip_secondary_url() -> String {
    "https://ip-api.com/json?fields=lat,lon".to_string()
}

fn default_device_timeout() -> u32 {
    5
}

fn default_ip_timeout() -> u32 {
    4
}

fn default_refresh_interval() -> u32 {
    60
}

fn default_include_air_quality() -> bool {
    true
}

fn default_forecast_days() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            forecast_base_url: default_forecast_base_url(),
            air_quality_base_url: default_air_quality_base_url(),
            geocoding_base_url: default_geocoding_base_url(),
            timeout_seconds: default_network_timeout(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            ip_primary_url: default_ip_primary_url(),
            ip_secondary_url: default_ip_secondary_url(),
            device_timeout_seconds: default_device_timeout(),
            ip_timeout_seconds: default_ip_timeout(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_refresh_interval(),
            include_air_quality: default_include_air_quality(),
            forecast_days: default_forecast_days(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            location: LocationConfig::default(),
            refresh: RefreshConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with SKYCAST_ prefix
        builder = builder.add_source(
            Environment::with_prefix("SKYCAST")
                .separator("_")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: DashboardConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skycast").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.network.forecast_base_url.is_empty() {
            self.network.forecast_base_url = default_forecast_base_url();
        }
        if self.network.air_quality_base_url.is_empty() {
            self.network.air_quality_base_url = default_air_quality_base_url();
        }
        if self.network.geocoding_base_url.is_empty() {
            self.network.geocoding_base_url = default_geocoding_base_url();
        }
        if self.network.timeout_seconds == 0 {
            self.network.timeout_seconds = default_network_timeout();
        }
        if self.location.ip_primary_url.is_empty() {
            self.location.ip_primary_url = default_ip_primary_url();
        }
        if self.location.ip_secondary_url.is_empty() {
            self.location.ip_secondary_url = default_ip_secondary_url();
        }
        if self.location.device_timeout_seconds == 0 {
            self.location.device_timeout_seconds = default_device_timeout();
        }
        if self.location.ip_timeout_seconds == 0 {
            self.location.ip_timeout_seconds = default_ip_timeout();
        }
        if self.refresh.interval_seconds == 0 {
            self.refresh.interval_seconds = default_refresh_interval();
        }
        if self.refresh.forecast_days == 0 {
            self.refresh.forecast_days = default_forecast_days();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.network.timeout_seconds > 300 {
            return Err(
                DashboardError::config("Network timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.location.device_timeout_seconds > 60 {
            return Err(DashboardError::config(
                "Device geolocation timeout cannot exceed 60 seconds",
            )
            .into());
        }

        if self.location.ip_timeout_seconds > 60 {
            return Err(
                DashboardError::config("IP geolocation timeout cannot exceed 60 seconds").into(),
            );
        }

        if self.refresh.interval_seconds < 5 {
            return Err(
                DashboardError::config("Refresh interval must be at least 5 seconds").into(),
            );
        }

        if self.refresh.interval_seconds > 3600 {
            return Err(
                DashboardError::config("Refresh interval cannot exceed 3600 seconds").into(),
            );
        }

        if self.refresh.forecast_days > 16 {
            return Err(DashboardError::config("Forecast days cannot exceed 16").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(DashboardError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(DashboardError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for url in [
            &self.network.forecast_base_url,
            &self.network.air_quality_base_url,
            &self.network.geocoding_base_url,
            &self.location.ip_primary_url,
            &self.location.ip_secondary_url,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DashboardError::config(format!(
                    "Endpoint '{url}' must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
