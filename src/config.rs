//! Configuration and settings management
//!
//! Loads credentials from environment variables and defines the polling
//! defaults.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Review-status endpoint queried on every poll cycle
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Seconds to sleep between poll cycles
pub const POLL_INTERVAL_SECS: u64 = 600;

/// Timeout for a single request to the review API, in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// File that receives a copy of the log stream
pub const LOG_FILE: &str = "main.log";

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// OAuth token for the Practicum review API
    pub practicum_token: String,

    /// Telegram Bot API token
    pub telegram_token: String,

    /// Chat that receives notifications: a numeric id or `@channelname`
    pub telegram_chat_id: String,

    /// Review-status endpoint, overridable for staging environments
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use practicum_status_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or a required credential is
    /// missing.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default").required(false))
            // Add in the current environment file
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked into git
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of APP)
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Also add settings from environment variables directly (without prefix)
            // Note: Environment::default() auto-converts UPPER_SNAKE_CASE to snake_case
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?
            .try_deserialize()
    }
}

/// Get the poll interval from env or default.
///
/// Environment variable: `POLL_INTERVAL_SECS`.
#[must_use]
pub fn get_poll_interval_secs() -> u64 {
    std::env::var("POLL_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(POLL_INTERVAL_SECS)
}

/// Get the request timeout from env or default.
///
/// Environment variable: `REQUEST_TIMEOUT_SECS`.
#[must_use]
pub fn get_request_timeout_secs() -> u64 {
    std::env::var("REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(REQUEST_TIMEOUT_SECS)
}

/// Get the log file path from env or default.
///
/// Environment variable: `LOG_FILE`.
#[must_use]
pub fn get_log_file() -> String {
    std::env::var("LOG_FILE").unwrap_or_else(|_| LOG_FILE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Tests run sequentially within one function to avoid environment
    // variable race conditions
    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        // 1. All required credentials present, endpoint falls back to default
        env::set_var("PRACTICUM_TOKEN", "y0_dummy_practicum");
        env::set_var("TELEGRAM_TOKEN", "dummy_token");
        env::set_var("TELEGRAM_CHAT_ID", "123456");

        let settings = Settings::new()?;
        assert_eq!(settings.practicum_token, "y0_dummy_practicum");
        assert_eq!(settings.telegram_chat_id, "123456");
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);

        // 2. Endpoint override is picked up
        env::set_var("ENDPOINT", "http://localhost:9111/api/statuses/");
        let settings = Settings::new()?;
        assert_eq!(settings.endpoint, "http://localhost:9111/api/statuses/");
        env::remove_var("ENDPOINT");

        // 3. Empty env var is treated as unset, so deserialization fails
        env::set_var("PRACTICUM_TOKEN", "");
        let result = Settings::new();
        assert!(result.is_err());
        let message = result.expect_err("empty token must not load").to_string();
        assert!(
            message.contains("practicum_token"),
            "error should name the missing field: {message}"
        );

        // 4. Missing credentials fail the load outright
        env::remove_var("PRACTICUM_TOKEN");
        assert!(Settings::new().is_err());

        env::set_var("PRACTICUM_TOKEN", "y0_dummy_practicum");
        env::remove_var("TELEGRAM_CHAT_ID");
        assert!(Settings::new().is_err());

        env::remove_var("PRACTICUM_TOKEN");
        env::remove_var("TELEGRAM_TOKEN");
        Ok(())
    }

    #[test]
    fn test_tunable_helpers() {
        env::remove_var("POLL_INTERVAL_SECS");
        assert_eq!(get_poll_interval_secs(), POLL_INTERVAL_SECS);

        env::set_var("POLL_INTERVAL_SECS", "5");
        assert_eq!(get_poll_interval_secs(), 5);

        env::set_var("POLL_INTERVAL_SECS", "not-a-number");
        assert_eq!(get_poll_interval_secs(), POLL_INTERVAL_SECS);
        env::remove_var("POLL_INTERVAL_SECS");

        env::remove_var("REQUEST_TIMEOUT_SECS");
        assert_eq!(get_request_timeout_secs(), REQUEST_TIMEOUT_SECS);
        env::set_var("REQUEST_TIMEOUT_SECS", "90");
        assert_eq!(get_request_timeout_secs(), 90);
        env::remove_var("REQUEST_TIMEOUT_SECS");

        env::remove_var("LOG_FILE");
        assert_eq!(get_log_file(), LOG_FILE);
        env::set_var("LOG_FILE", "/tmp/bot.log");
        assert_eq!(get_log_file(), "/tmp/bot.log");
        env::remove_var("LOG_FILE");
    }
}
