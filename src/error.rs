use thiserror::Error;

/// Failures talking to the home-automation hub. Opaque to the core: it only
/// reports them.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("hub request timed out: {0}")]
    Timeout(String),

    #[error("hub request failed: {0}")]
    Transport(String),

    #[error("hub answered {code} for {url}")]
    Status { code: u16, url: String },

    #[error("could not decode hub response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for HubError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HubError::Timeout(e.to_string())
        } else if e.is_decode() {
            HubError::Decode(e.to_string())
        } else {
            HubError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
