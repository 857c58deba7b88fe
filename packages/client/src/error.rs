//! Error types for the Curse notification client.

use thiserror::Error;

use crate::listener::DisconnectReason;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Login or session creation was rejected by the service
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The REST endpoint answered with a non-success status
    #[error("{endpoint} returned HTTP {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The notification socket is not open
    #[error("Not connected to the notification service")]
    NotConnected,

    /// The notification socket went down while in use
    #[error("Connection lost: {0}")]
    Disconnected(DisconnectReason),

    /// The notification socket is already open
    #[error("Already connected to the notification service")]
    AlreadyConnected,

    /// The transport has no session credentials yet
    #[error("Missing session credentials; authenticate first")]
    MissingCredentials,

    /// Configured URL is not usable
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(error))
    }
}

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials were rejected
    Authentication,
    /// Network or local I/O failure
    Io,
    /// The service sent something we could not understand, or we could not encode a request
    Protocol,
    /// The operation is not valid in the current connection state
    State,
}

impl ClientError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationFailed(_) => ErrorKind::Authentication,
            Self::Http(_) | Self::WebSocket(_) | Self::Io(_) | Self::Disconnected(_) => {
                ErrorKind::Io
            }
            Self::UnexpectedStatus { .. } | Self::Serialization(_) | Self::InvalidUrl(_) => {
                ErrorKind::Protocol
            }
            Self::NotConnected | Self::AlreadyConnected | Self::MissingCredentials => {
                ErrorKind::State
            }
        }
    }

    /// `true` if the service rejected the credentials.
    pub fn is_authentication_failure(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }
}
