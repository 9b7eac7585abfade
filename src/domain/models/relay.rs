#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use thiserror::Error;

use super::Message;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayRequest {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub model: String,
}

/// Envelope returned by the relay for every failure path so a client can
/// always render something.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default)]
    pub response: String,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("upstream credential is not configured")]
    Unconfigured,

    #[error("upstream rejected the configured credential")]
    UpstreamAuth,

    #[error("upstream throttled the request")]
    Throttled,

    #[error("upstream request failed: {0}")]
    Upstream(String),
}

impl RelayError {
    pub fn code(&self) -> &'static str {
        return match self {
            RelayError::InvalidRequest(_) => "invalid_request",
            RelayError::Unconfigured => "not_configured",
            RelayError::UpstreamAuth => "upstream_auth",
            RelayError::Throttled => "rate_limited",
            RelayError::Upstream(_) => "upstream_error",
        };
    }

    pub fn fallback_text(&self) -> String {
        return match self {
            RelayError::InvalidRequest(detail) => format!("The request was rejected: {detail}."),
            RelayError::Unconfigured => {
                "The AI is not configured yet. Please set up the upstream API key.".to_string()
            }
            RelayError::UpstreamAuth => {
                "The AI rejected the configured credentials. Please check the upstream API key."
                    .to_string()
            }
            RelayError::Throttled => "Too many requests. Please try again in a moment.".to_string(),
            RelayError::Upstream(_) => {
                "Something went wrong with the AI. Please try again.".to_string()
            }
        };
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        return ErrorEnvelope {
            error: self.code().to_string(),
            response: self.fallback_text(),
        };
    }
}
