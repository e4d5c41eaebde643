//! Error types for the booking client.

use deskbook_engine::EngineError;
use thiserror::Error;

/// Why the planner refused to hand a booking to the backend.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BlockReason {
    #[error("no resource selected")]
    NoResource,

    #[error("no time window selected")]
    NoWindow,

    #[error("invalid time window: {0}")]
    InvalidWindow(String),

    #[error("availability has not been confirmed yet")]
    AwaitingAvailability,

    #[error("availability could not be loaded: {0}")]
    AvailabilityFailed(String),

    /// The proposed window overlaps existing reservations.
    #[error("time conflict with {count} existing booking(s)")]
    Conflict { count: usize },
}

/// Errors that can occur while talking to the booking backend.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    /// Connection-level failure
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// The backend answered 401
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Token refresh failed; the session has been cleared
    #[error("Session expired: {message}")]
    SessionExpired { message: String },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Could not decode response: {message}")]
    Decode { message: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The backend rejected a booking the client considered conflict-free,
    /// typically because another booking won the race.
    #[error("Booking rejected by the server: {message}")]
    SubmitConflict { message: String },

    /// The client-side gate is closed; nothing was sent.
    #[error("Booking blocked: {0}")]
    Blocked(BlockReason),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ClientError {
    /// Returns true if a token refresh might fix this error.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// Returns true if this error is potentially transient and retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network { .. } | ClientError::Timeout { .. } => true,
            ClientError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else if err.is_decode() {
            ClientError::Decode {
                message: err.to_string(),
            }
        } else {
            ClientError::Network {
                message: err.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config {
            message: format!("invalid URL: {}", err),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
