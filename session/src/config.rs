//! Session configuration: backend location, time budgets and refresh policy.

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 5 * 60;
pub const DEFAULT_REFRESH_THROTTLE_SECS: u64 = 30;
pub const DEFAULT_REFRESH_MAX_FAILURES: u32 = 3;

/// Errors produced while building a [`SessionConfig`] from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    /// Budget for login and password-reset exchanges.
    pub login_timeout: Duration,
    /// Budget for authenticated reads (`/api/auth/me`, domain endpoints).
    pub request_timeout: Duration,
    /// Period of the scheduled background refresh.
    pub refresh_interval: Duration,
    /// Non-forced refreshes closer together than this return the cached user.
    pub refresh_throttle: Duration,
    /// Consecutive scheduled failures after which the timer halts.
    pub max_refresh_failures: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            login_timeout: Duration::from_secs(DEFAULT_LOGIN_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            refresh_throttle: Duration::from_secs(DEFAULT_REFRESH_THROTTLE_SECS),
            max_refresh_failures: DEFAULT_REFRESH_MAX_FAILURES,
        }
    }
}

impl SessionConfig {
    /// Default policy against the given backend.
    #[must_use]
    pub fn with_api_url(api_url: &str) -> Self {
        Self { api_url: normalize_url(api_url), ..Self::default() }
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `STREAMPAY_API_URL`: backend base URL
    /// - `STREAMPAY_LOGIN_TIMEOUT_SECS`: default 15, must be at least 1
    /// - `STREAMPAY_REQUEST_TIMEOUT_SECS`: default 10, must be at least 1
    /// - `STREAMPAY_REFRESH_INTERVAL_SECS`: default 300, must be at least 1
    /// - `STREAMPAY_REFRESH_THROTTLE_SECS`: default 30, 0 disables it
    /// - `STREAMPAY_REFRESH_MAX_FAILURES`: default 3, must be at least 1
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the URL is blank, or when a
    /// numeric setting is not a number or is below its minimum.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("STREAMPAY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        if api_url.trim().is_empty() {
            return Err(ConfigError::Parse("STREAMPAY_API_URL is empty".into()));
        }

        let max_refresh_failures = match std::env::var("STREAMPAY_REFRESH_MAX_FAILURES") {
            Ok(raw) => parse_max_failures(&raw)?,
            Err(_) => DEFAULT_REFRESH_MAX_FAILURES,
        };

        Ok(Self {
            api_url: normalize_url(&api_url),
            login_timeout: env_secs("STREAMPAY_LOGIN_TIMEOUT_SECS", DEFAULT_LOGIN_TIMEOUT_SECS, 1)?,
            request_timeout: env_secs("STREAMPAY_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS, 1)?,
            refresh_interval: env_secs("STREAMPAY_REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL_SECS, 1)?,
            refresh_throttle: env_secs("STREAMPAY_REFRESH_THROTTLE_SECS", DEFAULT_REFRESH_THROTTLE_SECS, 0)?,
            max_refresh_failures,
        })
    }

    /// Absolute URL for a backend path such as `/api/auth/me`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.api_url, path)
    }
}

/// Join a base URL and an absolute path with exactly one slash between them.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn normalize_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn env_secs(key: &str, default: u64, min: u64) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse_secs(key, &raw, min).map(Duration::from_secs),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

fn parse_secs(key: &str, raw: &str, min: u64) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs < min => Err(ConfigError::Parse(format!("{key} must be at least {min}"))),
        Ok(secs) => Ok(secs),
        Err(_) => Err(ConfigError::Parse(format!("invalid {key}: {raw}"))),
    }
}

fn parse_max_failures(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(ConfigError::Parse("STREAMPAY_REFRESH_MAX_FAILURES must be at least 1".into())),
        Ok(n) => Ok(n),
        Err(_) => Err(ConfigError::Parse(format!("invalid STREAMPAY_REFRESH_MAX_FAILURES: {raw}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
