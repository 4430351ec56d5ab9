use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    pub hub_url: String,
    pub hub_token: String,
    pub bind: SocketAddr,
    pub context_ttl: Duration,
    pub hub_timeout: Duration,
    /// Pause between device calls of a multi-clause command.
    pub multi_pause: Duration,
    /// Directory for the daily log file; `None` logs to the console only.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        Ok(Self {
            hub_url: required("HA_URL")?,
            hub_token: required("HA_TOKEN")?,
            bind: parse_or(&lookup, "FRIDAY_BIND", SocketAddr::from(([0, 0, 0, 0], 8000)))?,
            context_ttl: Duration::from_secs(parse_or(&lookup, "FRIDAY_CONTEXT_TTL_SECS", 10)?),
            hub_timeout: Duration::from_secs(parse_or(&lookup, "FRIDAY_HUB_TIMEOUT_SECS", 5)?),
            multi_pause: Duration::from_millis(parse_or(&lookup, "FRIDAY_MULTI_PAUSE_MS", 400)?),
            log_dir: match lookup("FRIDAY_LOG_DIR") {
                None => Some(PathBuf::from("logs")),
                Some(dir) if dir.trim().is_empty() => None,
                Some(dir) => Some(PathBuf::from(dir.trim())),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
