//! API response structures

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::TimerError, state::{SessionLogEntry, TimerSnapshot}};

/// API response structure for timer endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Status follows whether the countdown is running
    pub fn from_snapshot(message: impl Into<String>, timer: TimerSnapshot) -> Self {
        let status = if timer.is_active { "running" } else { "paused" };
        Self::new(status.to_string(), message.into(), timer)
    }
}

/// Finished sessions, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLogResponse {
    pub sessions: Vec<SessionLogEntry>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

impl HealthResponse {
    pub fn ok(uptime: String, last_action: Option<String>, last_action_time: Option<DateTime<Utc>>) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime,
            last_action,
            last_action_time,
        }
    }
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Handler error; maps each `TimerError` or rejected body to a status code
#[derive(Debug)]
pub enum ApiError {
    Timer(TimerError),
    /// The request body could not be read as the expected JSON
    Rejected(JsonRejection),
}

impl From<TimerError> for ApiError {
    fn from(error: TimerError) -> Self {
        Self::Timer(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Timer(TimerError::Backend(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Timer(TimerError::InvalidPreset(_)) => StatusCode::BAD_REQUEST,
            ApiError::Timer(TimerError::StudyTypeLocked) => StatusCode::CONFLICT,
            ApiError::Timer(TimerError::Lock(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected(rejection) => rejection.status(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Timer(error) => error.code(),
            ApiError::Rejected(_) => "INVALID_REQUEST",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Timer(error) => error.to_string(),
            ApiError::Rejected(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "error".to_string(),
            code: self.code().to_string(),
            message: self.message(),
            timestamp: Utc::now(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// `Json` extractor whose rejection is a JSON `ErrorResponse`
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
