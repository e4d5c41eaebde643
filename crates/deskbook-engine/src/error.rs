//! Error types for deskbook-engine operations.

use thiserror::Error;

use crate::time::TimeMinutes;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The input was not an `H:MM` / `HH:MM` 24-hour time.
    #[error("Invalid time '{0}': expected H:MM or HH:MM")]
    InvalidTime(String),

    #[error("Invalid window {start}-{end}: start must be before end")]
    InvalidWindow { start: TimeMinutes, end: TimeMinutes },

    #[error("Invalid resource id '{0}'")]
    InvalidResource(String),

    /// A booking rule for the resource kind was violated.
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// A form field failed validation.
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

impl EngineError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
