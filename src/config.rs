use std::{env, path::PathBuf, time::Duration};

use crate::budget::DurationPolicy;
use crate::constants::*;
use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the SmartTravel backend, without trailing slash
    pub api_url: String,
    /// Directory holding the persisted session file
    pub data_path: PathBuf,
    /// Count both the first and the last day of a trip
    pub inclusive_days: bool,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            inclusive_days: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, so tests don't have to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(ENV_API_URL)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "invalid {ENV_API_URL}: '{api_url}' is not an http(s) URL"
            )));
        }

        let data_path = lookup(ENV_DATA_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let inclusive_days = match lookup(ENV_INCLUSIVE_DAYS) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ClientError::Config(format!("invalid {ENV_INCLUSIVE_DAYS}: '{raw}'"))
            })?,
            None => true,
        };

        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ClientError::Config(format!("invalid {ENV_TIMEOUT_SECS}: '{raw}'"))
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url,
            data_path,
            inclusive_days,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn duration_policy(&self) -> DurationPolicy {
        if self.inclusive_days {
            DurationPolicy::Inclusive
        } else {
            DurationPolicy::Exclusive
        }
    }

    pub fn session_file(&self) -> PathBuf {
        self.data_path.join(SESSION_FILE_NAME)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
