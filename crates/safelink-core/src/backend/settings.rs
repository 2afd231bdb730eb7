use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Connection settings for the analysis backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub api_url: String,
    /// Request timeout, humantime syntax (`30s`, `2m`).
    pub timeout: String,
    pub max_retries: u32,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            timeout: "30s".to_string(),
            max_retries: 0,
        }
    }
}

impl BackendSettings {
    const DEFAULT_API_URL: &'static str = "http://localhost:3001";
    const API_URL_ENV: &'static str = "SAFELINK_API_URL";
    const TIMEOUT_ENV: &'static str = "SAFELINK_TIMEOUT";
    const RETRIES_ENV: &'static str = "SAFELINK_MAX_RETRIES";

    /// Load settings from environment variables.
    ///
    /// * `SAFELINK_API_URL`: backend base URL (default: `http://localhost:3001`).
    /// * `SAFELINK_TIMEOUT`: request timeout (default: `30s`).
    /// * `SAFELINK_MAX_RETRIES`: transport retries (default: 0).
    pub fn from_env() -> Result<Self> {
        Self::from_map(std::env::vars().collect())
    }

    fn from_map(vars: HashMap<String, String>) -> Result<Self> {
        let defaults = Self::default();
        let api_url = vars
            .get(Self::API_URL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);
        let timeout = vars
            .get(Self::TIMEOUT_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.timeout);
        let max_retries = match vars.get(Self::RETRIES_ENV) {
            Some(raw) => raw.trim().parse::<u32>().with_context(|| {
                format!("{} must be a non-negative integer", Self::RETRIES_ENV)
            })?,
            None => defaults.max_retries,
        };

        let settings = Self {
            api_url,
            timeout,
            max_retries,
        };
        settings.timeout_duration()?;
        Ok(settings)
    }

    pub fn timeout_duration(&self) -> Result<Duration> {
        humantime::parse_duration(self.timeout.trim())
            .with_context(|| format!("invalid backend timeout `{}`", self.timeout))
    }
}
