//! Application-wide error types.

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure: no usable response from the server.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The access token was rejected and could not be refreshed. Terminal
    /// for the current request; the session is dead and the consumer must
    /// force a logout.
    #[error("Session expired - please log in again")]
    AuthExpired,

    /// Non-2xx response outside the refresh path. Carries the server's own
    /// message when it provided one.
    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Composing a profile from upstream data failed. This indicates a
    /// contract violation rather than an environmental failure and is
    /// always surfaced to the caller.
    #[error("Profile assembly error: {0}")]
    Assembly(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Whether the session is dead and the consumer must force a logout.
    #[inline]
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }

    /// Whether this error came from the transport rather than the server.
    #[inline]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
