//! Error model used by Clockify API client operations.

use std::io;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClockifyError>;

/// Represents the error conditions that can occur during Clockify API interactions, including HTTP errors with status and message, authentication failures, timeouts, network issues, serialization problems and other unexpected errors.
#[derive(Debug, Error)]
pub enum ClockifyError {
    #[error("http {status}: {message}")]
    Http {
        status: StatusCode,
        message: String,
    },
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl ClockifyError {
    /// Constructs an HTTP error variant from a non-success response.
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        ClockifyError::Http {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ClockifyError {
    /// Converts reqwest errors into semantic ClockifyError variants.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClockifyError::Timeout(err.to_string())
        } else if err.is_status() {
            let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            ClockifyError::Http {
                status,
                message: err.to_string(),
            }
        } else if err.is_connect() {
            ClockifyError::Network(err.to_string())
        } else {
            ClockifyError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClockifyError {
    /// Converts serde_json decode/encode failures into serialization errors.
    fn from(err: serde_json::Error) -> Self {
        ClockifyError::Serialization(err.to_string())
    }
}
