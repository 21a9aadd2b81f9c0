//! Application configuration management.

use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Ledger sync configuration.
    #[serde(default)]
    pub sync: SyncConfig,
    /// AI categorization service configuration.
    #[serde(default)]
    pub categorizer: CategorizerConfig,
    /// Active business configuration.
    #[serde(default)]
    pub business: BusinessConfig,
}

/// Ledger sync configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Debounce window for remote change notifications, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Upper bound for a single network call, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Number of entries in the recent activity feed.
    #[serde(default = "default_recent_activity_limit")]
    pub recent_activity_limit: usize,
    /// IANA time zone used to decide what "today" is for the business.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_debounce_ms() -> u64 {
    450
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_recent_activity_limit() -> usize {
    10
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            recent_activity_limit: default_recent_activity_limit(),
            timezone: default_timezone(),
        }
    }
}

impl SyncConfig {
    /// Debounce window as a `Duration`.
    #[must_use]
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Network timeout as a `Duration`.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Parses the configured time zone.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if the name is not a known IANA zone.
    pub fn time_zone(&self) -> Result<Tz, AppError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| AppError::Configuration(format!("invalid timezone: {e}")))
    }
}

/// AI categorization service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CategorizerConfig {
    /// Whether suggestions are requested at all.
    #[serde(default = "default_categorizer_enabled")]
    pub enabled: bool,
    /// Base URL of the service.
    #[serde(default = "default_categorizer_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_categorizer_timeout_secs")]
    pub timeout_secs: u64,
    /// Suggestions at or below this confidence are ignored.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Maximum cached suggestions.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Lifetime of a cached suggestion in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_categorizer_enabled() -> bool {
    true
}

fn default_categorizer_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_categorizer_timeout_secs() -> u64 {
    5
}

fn default_min_confidence() -> f64 {
    0.6
}

fn default_cache_capacity() -> u64 {
    1000
}

fn default_cache_ttl_secs() -> u64 {
    3600 // 1 hour
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            enabled: default_categorizer_enabled(),
            base_url: default_categorizer_url(),
            timeout_secs: default_categorizer_timeout_secs(),
            min_confidence: default_min_confidence(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Active business configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessConfig {
    /// Business to open; a fresh id is used when absent.
    pub id: Option<Uuid>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BIZTRACK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        temp_env::with_vars_unset(
            ["BIZTRACK__SYNC__DEBOUNCE_MS", "BIZTRACK__CATEGORIZER__ENABLED"],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.sync.debounce_ms, 450);
                assert_eq!(config.sync.fetch_timeout_secs, 30);
                assert_eq!(config.sync.recent_activity_limit, 10);
                assert!(config.categorizer.enabled);
                assert!(config.business.id.is_none());
            },
        );
    }

    #[test]
    fn test_environment_overrides() {
        temp_env::with_vars(
            [
                ("BIZTRACK__SYNC__DEBOUNCE_MS", Some("200")),
                ("BIZTRACK__SYNC__TIMEZONE", Some("Africa/Nairobi")),
                ("BIZTRACK__CATEGORIZER__ENABLED", Some("false")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.sync.debounce_window(), Duration::from_millis(200));
                assert_eq!(config.sync.time_zone().unwrap(), chrono_tz::Africa::Nairobi);
                assert!(!config.categorizer.enabled);
            },
        );
    }

    #[test]
    fn test_invalid_timezone() {
        let sync = SyncConfig {
            timezone: "Mars/Olympus".to_string(),
            ..SyncConfig::default()
        };
        assert!(matches!(
            sync.time_zone(),
            Err(AppError::Configuration(_))
        ));
    }
}
