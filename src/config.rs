//! Configuration management for `skycast`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::SkycastError;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration structure for `skycast`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkycastConfig {
    /// Geocoding API configuration
    #[serde(default)]
    pub geocoding: ServiceConfig,
    /// Forecast API configuration
    #[serde(default = "default_weather_service")]
    pub weather: ServiceConfig,
    /// How timestamps are presented
    #[serde(default)]
    pub display: DisplayConfig,
    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings shared by both remote services
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// API key sent with every request
    pub api_key: Option<String>,
    /// Base URL of the API
    #[serde(default)]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_seconds: u32,
    /// Retries for transient failures
    #[serde(default)]
    pub max_retries: u32,
}

/// Presentation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// IANA time zone for labels; system local time when unset
    pub timezone: Option<String>,
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
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
fn default_geocoding_base_url() -> String {
    "https://api.opencagedata.com/geocode/v1".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_weather_max_retries() -> u32 {
    2
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_weather_service() -> ServiceConfig {
    ServiceConfig {
        api_key: None,
        base_url: default_weather_base_url(),
        timeout_seconds: default_timeout(),
        max_retries: default_weather_max_retries(),
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: 0,
        }
    }
}

impl Default for SkycastConfig {
    fn default() -> Self {
        Self {
            geocoding: ServiceConfig::default(),
            weather: default_weather_service(),
            display: DisplayConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
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

// Keys never reach logs or `skycast config` output.
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &self.masked_api_key())
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl ServiceConfig {
    /// API key with everything but the last four characters hidden
    #[must_use]
    pub fn masked_api_key(&self) -> String {
        match &self.api_key {
            None => "<unset>".to_string(),
            Some(key) if key.chars().count() <= 4 => "****".to_string(),
            Some(key) => {
                let tail: String = key.chars().skip(key.chars().count() - 4).collect();
                format!("****{tail}")
            }
        }
    }

    /// The configured key, or an error naming the env var to set
    pub fn require_api_key(&self, section: &str) -> Result<&str, SkycastError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(SkycastError::config(format!(
                "Missing {section} API key. Set SKYCAST_{}__API_KEY or add api_key to the [{section}] section of your config file.",
                section.to_uppercase()
            ))),
        }
    }
}

impl SkycastConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        Self::load_from_sources(config_path, None)
    }

    /// Load from `config_path` and the environment; `env` replaces the process
    /// environment when given
    fn load_from_sources(
        config_path: Option<PathBuf>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        // Per-section defaults survive partially specified sections
        for (key, value) in [
            ("geocoding.base_url", default_geocoding_base_url()),
            ("weather.base_url", default_weather_base_url()),
        ] {
            builder = builder.set_default(key, value)?;
        }
        for (key, value) in [
            ("geocoding.timeout_seconds", default_timeout()),
            ("weather.timeout_seconds", default_timeout()),
            ("geocoding.max_retries", 0),
            ("weather.max_retries", default_weather_max_retries()),
        ] {
            builder = builder.set_default(key, value)?;
        }

        let config_file = config_path.unwrap_or_else(|| {
            Self::config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SKYCAST_WEATHER__API_KEY -> weather.api_key
        // Values stay strings; numeric fields convert on deserialization
        builder = builder.add_source(
            Environment::with_prefix("SKYCAST")
                .prefix_separator("_")
                .separator("__")
                .source(env),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SkycastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate_settings()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skycast").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_timeout();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.bind.is_empty() {
            self.server.bind = default_bind();
        }
    }

    /// Validate all configuration settings, API keys included
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_settings()
    }

    /// Validate everything except the presence of API keys
    pub fn validate_settings(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Both services need a key; credentials are never compiled in
    pub fn validate_api_keys(&self) -> Result<()> {
        self.geocoding.require_api_key("geocoding")?;
        self.weather.require_api_key("weather")?;
        Ok(())
    }

    /// The display zone, if one is configured
    pub fn display_timezone(&self) -> Result<Option<Tz>> {
        match self.display.timezone.as_deref() {
            None | Some("") => Ok(None),
            Some(name) => name.parse::<Tz>().map(Some).map_err(|_| {
                SkycastError::config(format!("Unknown time zone '{name}'")).into()
            }),
        }
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        for (section, service) in [("geocoding", &self.geocoding), ("weather", &self.weather)] {
            if service.timeout_seconds > 300 {
                return Err(SkycastError::config(format!(
                    "The {section} timeout cannot exceed 300 seconds"
                ))
                .into());
            }

            if service.max_retries > 10 {
                return Err(SkycastError::config(format!(
                    "The {section} max retries cannot exceed 10"
                ))
                .into());
            }
        }

        if self.server.port == 0 {
            return Err(SkycastError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SkycastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SkycastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (section, service) in [("geocoding", &self.geocoding), ("weather", &self.weather)] {
            if !service.base_url.starts_with("http://") && !service.base_url.starts_with("https://") {
                return Err(SkycastError::config(format!(
                    "The {section} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        self.display_timezone()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn with_keys() -> SkycastConfig {
        let mut config = SkycastConfig::default();
        config.geocoding.api_key = Some("geo_key_123".to_string());
        config.weather.api_key = Some("weather_key_456".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = SkycastConfig::default();
        assert_eq!(
            config.geocoding.base_url,
            "https://api.opencagedata.com/geocode/v1"
        );
        assert_eq!(config.weather.base_url, "https://api.openweathermap.org/data/2.5");
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.weather.max_retries, 2);
        assert_eq!(config.geocoding.max_retries, 0);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.port, 8080);
        assert!(config.geocoding.api_key.is_none());
    }

    #[test]
    fn test_config_validation_missing_api_key() {
        let config = SkycastConfig::default();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("SKYCAST_GEOCODING__API_KEY"));
    }

    #[test]
    fn test_config_validation_blank_api_key() {
        let mut config = with_keys();
        config.weather.api_key = Some("   ".to_string());
        let result = config.validate_api_keys();
        assert!(result.unwrap_err().to_string().contains("weather API key"));
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(with_keys().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = with_keys();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = with_keys();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_unknown_timezone() {
        let mut config = with_keys();
        config.display.timezone = Some("Mars/Olympus_Mons".to_string());
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Unknown time zone"));

        config.display.timezone = Some("Europe/Berlin".to_string());
        assert_eq!(config.display_timezone().unwrap(), Some(chrono_tz::Europe::Berlin));
    }

    #[test]
    fn test_apply_defaults_fills_empty_fields() {
        let mut config = with_keys();
        config.weather.base_url.clear();
        config.geocoding.timeout_seconds = 0;
        config.logging.format.clear();
        config.apply_defaults();
        assert_eq!(config.weather.base_url, "https://api.openweathermap.org/data/2.5");
        assert_eq!(config.geocoding.timeout_seconds, 10);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[geocoding]
api_key = "file_geo_key"

[weather]
api_key = "file_weather_key"
timeout_seconds = 5

[display]
timezone = "UTC"

[server]
port = 9000
"#
        )
        .unwrap();

        let config = SkycastConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.weather.timeout_seconds, 5);
        assert_eq!(config.weather.max_retries, 2);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.geocoding.base_url, "https://api.opencagedata.com/geocode/v1");
        assert_eq!(config.display_timezone().unwrap(), Some(chrono_tz::UTC));
    }

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_load_from_env_only_keeps_section_defaults() {
        let config = SkycastConfig::load_from_sources(
            Some(PathBuf::from("/nonexistent/skycast.toml")),
            env(&[
                ("SKYCAST_WEATHER__API_KEY", "abc123"),
                ("SKYCAST_GEOCODING__API_KEY", "geo456"),
            ]),
        )
        .unwrap();

        assert_eq!(config.weather.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.weather.max_retries, 2);
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.weather.base_url, "https://api.openweathermap.org/data/2.5");
        assert_eq!(config.geocoding.max_retries, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_env_numeric_values() {
        let config = SkycastConfig::load_from_sources(
            Some(PathBuf::from("/nonexistent/skycast.toml")),
            env(&[
                ("SKYCAST_WEATHER__API_KEY", "00123"),
                ("SKYCAST_GEOCODING__API_KEY", "1e5"),
                ("SKYCAST_WEATHER__MAX_RETRIES", "4"),
                ("SKYCAST_SERVER__PORT", "9001"),
            ]),
        )
        .unwrap();

        assert_eq!(config.weather.api_key.as_deref(), Some("00123"));
        assert_eq!(config.geocoding.api_key.as_deref(), Some("1e5"));
        assert_eq!(config.weather.max_retries, 4);
        assert_eq!(config.server.port, 9001);
    }

    #[test]
    fn test_masked_api_key() {
        let config = with_keys();
        assert_eq!(config.weather.masked_api_key(), "****_456");
        assert_eq!(SkycastConfig::default().weather.masked_api_key(), "<unset>");

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("weather_key_456"));
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = SkycastConfig::config_path() {
            assert!(path.to_string_lossy().contains("skycast"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
