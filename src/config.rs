use std::time::Duration;

use crate::error::{BurndownError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the project-tracking API, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub org: String,
    pub project_title: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| -> Option<String> {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |key: &str| -> Result<String> {
            optional(key).ok_or_else(|| BurndownError::Config(format!("{key} must be set")))
        };

        let token = required("GITHUB_TOKEN")?;
        let org = required("ORG")?;
        let project_title = required("PROJECT_TITLE")?;

        let endpoint = optional("GITHUB_GRAPHQL_URL").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let timeout_secs = match optional("GITHUB_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => return Err(BurndownError::Config("GITHUB_TIMEOUT_SECS must be at least 1".to_string())),
                Ok(secs) => secs,
                Err(_) => {
                    return Err(BurndownError::Config(format!(
                        "GITHUB_TIMEOUT_SECS must be a whole number, got '{raw}'"
                    )))
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            token,
            org,
            project_title,
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
