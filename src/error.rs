//! Error types
//!
//! Backend errors come from the study REST API. Timer errors are what the
//! state layer hands back to its callers (the HTTP handlers).

use thiserror::Error;

/// Errors raised while talking to the study backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Unexpected backend response: {0}")]
    Decode(String),
}

/// Errors raised by the local settings store
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by timer operations
#[derive(Debug, Error)]
pub enum TimerError {
    /// A primary session call (start/end) failed; state was left untouched
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Unknown or non-applicable preset: {0}")]
    InvalidPreset(String),

    #[error("Study type cannot change while the timer is running")]
    StudyTypeLocked,

    #[error("Failed to lock timer state: {0}")]
    Lock(String),
}

impl TimerError {
    /// Short machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TimerError::Backend(_) => "BACKEND_ERROR",
            TimerError::InvalidPreset(_) => "INVALID_PRESET",
            TimerError::StudyTypeLocked => "STUDY_TYPE_LOCKED",
            TimerError::Lock(_) => "LOCK_ERROR",
        }
    }
}
