// Runtime configuration read from the environment (a `.env` file is honoured by `main`).
//
// Parsing is a pure function over a lookup so tests never touch the process environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::core::display::state::DisplayFlags;

const PREFIX: &str = "QUEUE_DISPLAY_";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub graphql_uri: String,
    pub stream_url: String,
    pub media_base_url: String,
    pub api_token: Option<String>,
    pub settings_file: Option<PathBuf>,
    pub queue_poll_interval: Duration,
    pub settings_poll_interval: Duration,
    pub ad_rotation_interval: Duration,
    pub flags: DisplayFlags,
}

fn invalid(key: &str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key: format!("{PREFIX}{key}"),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// `http://host:3000/graphql` -> `http://host:3000`.
pub fn media_base_from_graphql_uri(graphql_uri: &str) -> String {
    let trimmed = graphql_uri.trim_end_matches('/');
    trimmed
        .strip_suffix("/graphql")
        .unwrap_or(trimmed)
        .to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(&format!("{PREFIX}{key}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let millis = |key: &str, default: u64| -> Result<Duration, ConfigError> {
            match get(key) {
                None => Ok(Duration::from_millis(default)),
                Some(raw) => match raw.parse::<u64>() {
                    Ok(0) => Err(invalid(key, &raw, "must be greater than zero")),
                    Ok(ms) => Ok(Duration::from_millis(ms)),
                    Err(e) => Err(invalid(key, &raw, e)),
                },
            }
        };
        let flag = |key: &str, default: bool| -> Result<bool, ConfigError> {
            match get(key) {
                None => Ok(default),
                Some(raw) => match raw.to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" | "on" => Ok(true),
                    "false" | "0" | "no" | "off" => Ok(false),
                    _ => Err(invalid(key, &raw, "expected a boolean")),
                },
            }
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let bind_addr: SocketAddr = bind_raw
            .parse()
            .map_err(|e| invalid("BIND_ADDR", &bind_raw, e))?;
        let graphql_uri =
            get("GRAPHQL_URI").unwrap_or_else(|| "http://localhost:3000/graphql".to_string());
        let media_base_url = get("MEDIA_BASE_URL")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| media_base_from_graphql_uri(&graphql_uri));

        Ok(Self {
            bind_addr,
            stream_url: get("STREAM_URL")
                .unwrap_or_else(|| "http://localhost:3000/queue/stream".to_string()),
            media_base_url,
            graphql_uri,
            api_token: get("API_TOKEN"),
            settings_file: get("SETTINGS_FILE").map(PathBuf::from),
            queue_poll_interval: millis("QUEUE_POLL_MS", 3000)?,
            settings_poll_interval: millis("SETTINGS_POLL_MS", 2000)?,
            ad_rotation_interval: millis("AD_ROTATION_MS", 5000)?,
            flags: DisplayFlags {
                multi_serving: flag("MULTI_SERVING", true)?,
                audio_controls: flag("AUDIO_CONTROLS", true)?,
            },
        })
    }
}
