//! Configuration module for Feed Courier.

use serde::Deserialize;
use std::path::Path;

use chrono::Weekday;
use chrono_tz::Tz;

use crate::{CourierError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Digest period mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMode {
    /// One bucket per calendar day, with cutoff-hour rollover.
    Daily,
    /// One bucket per week, ending at a fixed weekday and hour.
    Weekly,
}

/// Digest aggregation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DigestConfig {
    /// Period mode (daily or weekly).
    #[serde(default = "default_mode")]
    pub mode: PeriodMode,
    /// IANA time zone for bucket boundaries (e.g., "America/Los_Angeles").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Local hour after which a submission rolls into the next bucket.
    /// Also the hour at which the scheduled digest fires.
    #[serde(default = "default_cutoff_hour")]
    pub cutoff_hour: u32,
    /// Weekday ending a weekly bucket (lowercase English name).
    #[serde(default = "default_weekday")]
    pub weekday: String,
    /// Expected daily entry count; fewer draws a "too few" remark,
    /// more draws a "too many" remark.
    #[serde(default = "default_expected_count")]
    pub expected_count: usize,
    /// Weekly upper threshold; more than this draws a "too many" remark.
    #[serde(default = "default_weekly_max")]
    pub weekly_max: usize,
}

fn default_mode() -> PeriodMode {
    PeriodMode::Daily
}

fn default_timezone() -> String {
    "America/Los_Angeles".to_string()
}

fn default_cutoff_hour() -> u32 {
    10
}

fn default_weekday() -> String {
    "sunday".to_string()
}

fn default_expected_count() -> usize {
    5
}

fn default_weekly_max() -> usize {
    10
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            timezone: default_timezone(),
            cutoff_hour: default_cutoff_hour(),
            weekday: default_weekday(),
            expected_count: default_expected_count(),
            weekly_max: default_weekly_max(),
        }
    }
}

impl DigestConfig {
    /// Parse the configured time zone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| CourierError::Config(format!("unknown time zone: {}", self.timezone)))
    }

    /// Parse the configured week-boundary weekday.
    pub fn boundary_weekday(&self) -> Result<Weekday> {
        match self.weekday.to_lowercase().as_str() {
            "monday" | "mon" => Ok(Weekday::Mon),
            "tuesday" | "tue" => Ok(Weekday::Tue),
            "wednesday" | "wed" => Ok(Weekday::Wed),
            "thursday" | "thu" => Ok(Weekday::Thu),
            "friday" | "fri" => Ok(Weekday::Fri),
            "saturday" | "sat" => Ok(Weekday::Sat),
            "sunday" | "sun" => Ok(Weekday::Sun),
            other => Err(CourierError::Config(format!("unknown weekday: {other}"))),
        }
    }
}

/// Webhook dispatch configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Destination webhook URLs, comma-separated.
    #[serde(default)]
    pub urls: String,
    /// Per-endpoint send timeout in seconds.
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
}

fn default_webhook_timeout() -> u64 {
    10
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            urls: String::new(),
            timeout_secs: default_webhook_timeout(),
        }
    }
}

/// Inbound API authentication configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// Shared secret for the bearer-token API auth (must be set).
    #[serde(default)]
    pub api_key: String,
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-memory bucket map (entries lost on restart).
    Memory,
    /// SQLite-backed store.
    Sqlite,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Backend to use.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Path to the SQLite database file (sqlite backend only).
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Memory
}

fn default_db_path() -> String {
    "data/courier.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/courier.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Digest aggregation configuration.
    #[serde(default)]
    pub digest: DigestConfig,
    /// Webhook dispatch configuration.
    #[serde(default)]
    pub webhook: WebhookConfig,
    /// API authentication.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(CourierError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| CourierError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `COURIER_API_KEY`: Override the shared API secret
    /// - `COURIER_WEBHOOK_URLS`: Override the webhook URL list
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("COURIER_API_KEY") {
            if !key.is_empty() {
                self.auth.api_key = key;
            }
        }
        if let Ok(urls) = std::env::var("COURIER_WEBHOOK_URLS") {
            if !urls.is_empty() {
                self.webhook.urls = urls;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - No webhook URL is configured
    /// - The API key is not set
    /// - The time zone or weekday does not parse
    /// - The cutoff hour is not a valid hour of day
    pub fn validate(&self) -> Result<()> {
        if self.webhook.urls.split(',').all(|u| u.trim().is_empty()) {
            return Err(CourierError::Config(
                "no webhook URL configured. \
                 Set webhook.urls in config.toml or via COURIER_WEBHOOK_URLS."
                    .to_string(),
            ));
        }
        if self.auth.api_key.is_empty() {
            return Err(CourierError::Config(
                "auth.api_key is not set. \
                 Set it in config.toml or via COURIER_API_KEY."
                    .to_string(),
            ));
        }
        self.digest.tz()?;
        self.digest.boundary_weekday()?;
        if self.digest.cutoff_hour > 23 {
            return Err(CourierError::Config(format!(
                "cutoff_hour must be 0-23, got {}",
                self.digest.cutoff_hour
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);

        assert_eq!(config.digest.mode, PeriodMode::Daily);
        assert_eq!(config.digest.timezone, "America/Los_Angeles");
        assert_eq!(config.digest.cutoff_hour, 10);
        assert_eq!(config.digest.weekday, "sunday");
        assert_eq!(config.digest.expected_count, 5);
        assert_eq!(config.digest.weekly_max, 10);

        assert!(config.webhook.urls.is_empty());
        assert_eq!(config.webhook.timeout_secs, 10);

        assert!(config.auth.api_key.is_empty());

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.path, "data/courier.db");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/courier.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9090

[digest]
mode = "weekly"
timezone = "Europe/Prague"
cutoff_hour = 18
weekday = "saturday"
expected_count = 3
weekly_max = 12

[webhook]
urls = "https://discord.example/a,https://discord.example/b"
timeout_secs = 5

[auth]
api_key = "sekrit"

[storage]
backend = "sqlite"
path = "custom/courier.db"

[logging]
level = "debug"
file = "custom/logs/courier.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);

        assert_eq!(config.digest.mode, PeriodMode::Weekly);
        assert_eq!(config.digest.timezone, "Europe/Prague");
        assert_eq!(config.digest.cutoff_hour, 18);
        assert_eq!(config.digest.weekday, "saturday");
        assert_eq!(config.digest.expected_count, 3);
        assert_eq!(config.digest.weekly_max, 12);

        assert_eq!(
            config.webhook.urls,
            "https://discord.example/a,https://discord.example/b"
        );
        assert_eq!(config.webhook.timeout_secs, 5);

        assert_eq!(config.auth.api_key, "sekrit");

        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.path, "custom/courier.db");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/courier.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[digest]
cutoff_hour = 22

[auth]
api_key = "k"
"#;

        let config = Config::parse(toml).unwrap();

        // Specified values
        assert_eq!(config.digest.cutoff_hour, 22);
        assert_eq!(config.auth.api_key, "k");

        // Default values
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.digest.mode, PeriodMode::Daily);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.digest.timezone, "America/Los_Angeles");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(CourierError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");

        assert!(result.is_err());
        assert!(matches!(result, Err(CourierError::Io(_))));
    }

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.webhook.urls = "https://discord.example/hook".to_string();
        config.auth.api_key = "secret".to_string();
        config
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_webhook_urls() {
        let mut config = valid_config();
        config.webhook.urls = String::new();

        let result = config.validate();
        assert!(result.is_err());
        if let Err(CourierError::Config(msg)) = result {
            assert!(msg.contains("webhook"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_validate_missing_api_key() {
        let mut config = valid_config();
        config.auth.api_key = String::new();

        let result = config.validate();
        assert!(result.is_err());
        if let Err(CourierError::Config(msg)) = result {
            assert!(msg.contains("api_key"));
        }
    }

    #[test]
    fn test_validate_unknown_timezone() {
        let mut config = valid_config();
        config.digest.timezone = "Mars/Olympus_Mons".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_cutoff_hour() {
        let mut config = valid_config();
        config.digest.cutoff_hour = 24;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_boundary_weekday_parsing() {
        let mut config = DigestConfig::default();
        assert_eq!(config.boundary_weekday().unwrap(), Weekday::Sun);

        config.weekday = "Sat".to_string();
        assert_eq!(config.boundary_weekday().unwrap(), Weekday::Sat);

        config.weekday = "noday".to_string();
        assert!(config.boundary_weekday().is_err());
    }

    #[test]
    fn test_apply_env_overrides_api_key() {
        // Save original value if exists
        let original = std::env::var("COURIER_API_KEY").ok();

        std::env::set_var("COURIER_API_KEY", "env-secret");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.auth.api_key, "env-secret");

        // Restore original
        if let Some(val) = original {
            std::env::set_var("COURIER_API_KEY", val);
        } else {
            std::env::remove_var("COURIER_API_KEY");
        }
    }

    #[test]
    fn test_apply_env_overrides_empty_value() {
        let original = std::env::var("COURIER_WEBHOOK_URLS").ok();

        std::env::set_var("COURIER_WEBHOOK_URLS", "");

        let mut config = Config::default();
        config.webhook.urls = "https://original.example/hook".to_string();
        config.apply_env_overrides();

        // Should not override with empty string
        assert_eq!(config.webhook.urls, "https://original.example/hook");

        if let Some(val) = original {
            std::env::set_var("COURIER_WEBHOOK_URLS", val);
        } else {
            std::env::remove_var("COURIER_WEBHOOK_URLS");
        }
    }
}
