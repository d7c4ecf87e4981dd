//! Error taxonomy for invoice generation runs.

use std::io;
use std::path::PathBuf;

use clockify_api::ClockifyError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InvoiceError>;

#[derive(Debug, Error)]
pub enum InvoiceError {
    /// A per-client config failed validation; generation for that config is
    /// skipped, batch processing continues.
    #[error("config {} failed validation: {}", path.display(), errors.join("; "))]
    ConfigInvalid { path: PathBuf, errors: Vec<String> },

    #[error("config file {} could not be read: {reason}", path.display())]
    ConfigUnreadable { path: PathBuf, reason: String },

    #[error("no invoice config named '{0}' was found")]
    ConfigNotFound(String),

    /// UserId or WorkspaceId is missing from the config. Carries the API
    /// key so the caller can run the id lookup and show the right values.
    #[error("UserId or WorkspaceId is missing from config")]
    MissingIds { api_key: String },

    #[error(transparent)]
    Api(#[from] ClockifyError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("settings error: {0}")]
    Settings(String),
}
