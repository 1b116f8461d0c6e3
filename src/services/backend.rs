//! Study backend contract
//!
//! The timer consumes five calls from the study REST API. The trait is
//! object-safe so `AppState` can hold any implementation behind an `Arc`.

use futures::future::BoxFuture;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{error::BackendError, state::StudyType};

/// Default durations served by the backend, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySettings {
    pub focus_duration: u32,
    pub break_duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartStudySession {
    pub goal: String,
    pub success_criteria: Option<String>,
    pub study_type: StudyType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndStudySession {
    pub reflection: String,
    pub effectiveness_rating: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartFocusSession {
    pub session_type: StudyType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndFocusSession {
    pub duration_minutes: i64,
    pub notes: String,
}

/// `{ id }` returned by the start calls
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionRef {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
}

/// Whatever the backend reports when a study session ends
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct SessionSummary(pub Value);

impl SessionSummary {
    pub fn id(&self) -> Option<String> {
        self.0.get("id").and_then(value_as_id)
    }

    pub fn duration_minutes(&self) -> Option<i64> {
        self.0.get("duration_minutes").and_then(Value::as_i64)
    }
}

/// Calls the timer makes against the study backend
pub trait StudyBackend: Send + Sync {
    fn get_study_settings(&self) -> BoxFuture<'_, Result<StudySettings, BackendError>>;

    fn start_study_session(
        &self,
        request: StartStudySession,
    ) -> BoxFuture<'_, Result<SessionRef, BackendError>>;

    fn end_study_session(
        &self,
        session_id: String,
        request: EndStudySession,
    ) -> BoxFuture<'_, Result<SessionSummary, BackendError>>;

    fn start_focus_session(
        &self,
        goal_id: String,
        request: StartFocusSession,
    ) -> BoxFuture<'_, Result<SessionRef, BackendError>>;

    fn end_focus_session(
        &self,
        focus_session_id: String,
        request: EndFocusSession,
    ) -> BoxFuture<'_, Result<(), BackendError>>;
}

fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// Backend ids show up as numbers or strings depending on the resource
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_id(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected string or number id, got {}", value)))
}
