//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{extract::State, response::Json};
use serde::Deserialize;
use tracing::{error, info};

use crate::state::{AppState, PresetKey, StudyType};
use crate::error::TimerError;
use super::responses::{ApiError, ApiJson, ApiResponse, HealthResponse, SessionLogResponse};

type ApiResult = Result<Json<ApiResponse>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct StudyTypeRequest {
    pub study_type: StudyType,
}

#[derive(Debug, Deserialize)]
pub struct DurationsRequest {
    pub focus_duration: Option<u32>,
    pub break_duration: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PresetRequest {
    pub preset: String,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub goal: String,
    pub goal_id: Option<String>,
    pub success_criteria: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EndSessionRequest {
    #[serde(default)]
    pub reflection: String,
    pub rating: u8,
}

/// Handle GET /timer - Return the current timer
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let snapshot = state.snapshot()?;
    Ok(Json(ApiResponse::from_snapshot("Current timer", snapshot)))
}

/// Handle POST /timer/toggle - Start or pause the countdown
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let snapshot = state.toggle_play_pause()?;
    let message = if snapshot.is_active { "Timer running" } else { "Timer paused" };
    Ok(Json(ApiResponse::from_snapshot(message, snapshot)))
}

/// Handle POST /timer/reset - Back to a full WORK phase
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let snapshot = state.reset()?;
    info!("Reset endpoint called - timer reset");
    Ok(Json(ApiResponse::from_snapshot("Timer reset", snapshot)))
}

/// Handle POST /timer/study-type - Switch between deep and practice
pub async fn study_type_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<StudyTypeRequest>,
) -> ApiResult {
    let snapshot = state.set_study_type(request.study_type)?;
    Ok(Json(ApiResponse::from_snapshot(
        format!("Study type set to {}", request.study_type.as_str()),
        snapshot,
    )))
}

/// Handle PUT /timer/durations - Change focus and/or break minutes
pub async fn durations_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<DurationsRequest>,
) -> ApiResult {
    if let Some(minutes) = request.focus_duration {
        state.set_focus_duration(minutes)?;
    }
    if let Some(minutes) = request.break_duration {
        state.set_break_duration(minutes)?;
    }
    let snapshot = state.snapshot()?;
    Ok(Json(ApiResponse::from_snapshot(
        format!(
            "Durations set: focus={}min, break={}min",
            snapshot.focus_duration, snapshot.break_duration
        ),
        snapshot,
    )))
}

/// Handle POST /timer/preset - Apply a named preset
pub async fn preset_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<PresetRequest>,
) -> ApiResult {
    let preset = PresetKey::from_name(&request.preset)
        .ok_or_else(|| TimerError::InvalidPreset(request.preset.clone()))?;
    let snapshot = state.apply_preset(preset)?;
    Ok(Json(ApiResponse::from_snapshot(
        format!("Preset {} applied", preset.as_str()),
        snapshot,
    )))
}

/// Handle POST /session/start - Open a study session and start the timer
pub async fn start_session_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<StartSessionRequest>,
) -> ApiResult {
    match state
        .start_session(request.goal, request.goal_id, request.success_criteria)
        .await
    {
        Ok(snapshot) => {
            info!("Session start endpoint called - session started");
            Ok(Json(ApiResponse::from_snapshot("Study session started", snapshot)))
        }
        Err(e) => {
            error!("Failed to start study session: {}", e);
            Err(e.into())
        }
    }
}

/// Handle POST /session/end - Close the active session
pub async fn end_session_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<EndSessionRequest>,
) -> ApiResult {
    match state.end_session_sync(request.reflection, request.rating).await {
        Ok(Some(snapshot)) => {
            info!("Session end endpoint called - session ended");
            Ok(Json(ApiResponse::from_snapshot("Study session ended", snapshot)))
        }
        Ok(None) => {
            let snapshot = state.snapshot()?;
            Ok(Json(ApiResponse::from_snapshot("No active study session", snapshot)))
        }
        Err(e) => {
            error!("Failed to end study session: {}", e);
            Err(e.into())
        }
    }
}

/// Handle GET /sessions - Finished sessions, newest first
pub async fn sessions_handler(State(state): State<Arc<AppState>>) -> Json<SessionLogResponse> {
    Json(SessionLogResponse {
        sessions: state.session_log(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (last_action, last_action_time) = state.get_last_action();
    Json(HealthResponse::ok(state.get_uptime(), last_action, last_action_time))
}
