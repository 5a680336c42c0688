//! Configuration management for the dashboard client

use std::time::Duration;

use crate::error::{MonitorError, Result};

/// Dashboard client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment (production, staging, development)
    pub environment: String,

    /// Log level, used when RUST_LOG is unset
    pub log_level: String,

    /// Monitoring API base URL, without the `/api` prefix
    pub api_base_url: String,

    /// Bearer credential issued by the auth service
    pub api_token: Option<String>,

    pub refresh_interval_seconds: u64,
    pub message_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            log_level: "info".to_string(),
            api_base_url: "http://localhost:8080".to_string(),
            api_token: None,
            refresh_interval_seconds: 30,
            message_timeout_seconds: 5,
            request_timeout_seconds: 15,
        }
    }
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            environment: var("ENVIRONMENT").unwrap_or(defaults.environment),

            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),

            api_base_url: var("MONITOR_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),

            api_token: var("MONITOR_API_TOKEN")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            refresh_interval_seconds: var("REFRESH_INTERVAL_SECONDS")
                .map(|v| v.parse().unwrap_or(30))
                .unwrap_or(defaults.refresh_interval_seconds),

            message_timeout_seconds: var("MESSAGE_TIMEOUT_SECONDS")
                .map(|v| v.parse().unwrap_or(5))
                .unwrap_or(defaults.message_timeout_seconds),

            request_timeout_seconds: var("REQUEST_TIMEOUT_SECONDS")
                .map(|v| v.parse().unwrap_or(15))
                .unwrap_or(defaults.request_timeout_seconds),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(MonitorError::Config(format!(
                "MONITOR_API_URL must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.refresh_interval_seconds == 0 {
            return Err(MonitorError::Config("refresh_interval_seconds must be positive".into()));
        }
        if self.message_timeout_seconds == 0 {
            return Err(MonitorError::Config("message_timeout_seconds must be positive".into()));
        }
        if self.request_timeout_seconds == 0 {
            return Err(MonitorError::Config("request_timeout_seconds must be positive".into()));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_secs(self.message_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
