//! Test doubles shared by unit tests across modules

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Mutex,
};

use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::Notify;

use crate::{
    error::BackendError,
    services::{
        EndFocusSession, EndStudySession, SessionRef, SessionSummary, StartFocusSession,
        StartStudySession, StudyBackend, StudySettings,
    },
    utils::Clock,
};

/// A call the scripted backend received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetSettings,
    StartStudy(StartStudySession),
    EndStudy(String, EndStudySession),
    StartFocus(String, StartFocusSession),
    EndFocus(String, EndFocusSession),
}

/// In-memory backend with per-call failure switches
#[derive(Default)]
pub struct ScriptedBackend {
    settings: Option<StudySettings>,
    fail_start_study: bool,
    fail_end_study: bool,
    fail_start_focus: bool,
    fail_end_focus: bool,
    start_gate: Option<Arc<Notify>>,
    end_gate: Option<Arc<Notify>>,
    next_id: AtomicU32,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            settings: Some(StudySettings {
                focus_duration: 25,
                break_duration: 5,
            }),
            next_id: AtomicU32::new(100),
            ..Self::default()
        }
    }

    pub fn with_settings(mut self, settings: Option<StudySettings>) -> Self {
        self.settings = settings;
        self
    }

    pub fn failing_start_study(mut self) -> Self {
        self.fail_start_study = true;
        self
    }

    pub fn failing_end_study(mut self) -> Self {
        self.fail_end_study = true;
        self
    }

    pub fn failing_start_focus(mut self) -> Self {
        self.fail_start_focus = true;
        self
    }

    pub fn failing_end_focus(mut self) -> Self {
        self.fail_end_focus = true;
        self
    }

    /// Hold `start_study_session` until the gate is notified
    pub fn gated_start(mut self, gate: Arc<Notify>) -> Self {
        self.start_gate = Some(gate);
        self
    }

    /// Hold `end_study_session` until the gate is notified
    pub fn gated_end(mut self, gate: Arc<Notify>) -> Self {
        self.end_gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn next_ref(&self) -> SessionRef {
        SessionRef {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
        }
    }
}

fn scripted_failure() -> BackendError {
    BackendError::Status {
        status: 500,
        body: "scripted failure".to_string(),
    }
}

impl StudyBackend for ScriptedBackend {
    fn get_study_settings(&self) -> BoxFuture<'_, Result<StudySettings, BackendError>> {
        async move {
            self.record(Call::GetSettings);
            self.settings.ok_or_else(scripted_failure)
        }
        .boxed()
    }

    fn start_study_session(
        &self,
        request: StartStudySession,
    ) -> BoxFuture<'_, Result<SessionRef, BackendError>> {
        async move {
            self.record(Call::StartStudy(request));
            if let Some(gate) = &self.start_gate {
                gate.notified().await;
            }
            if self.fail_start_study {
                return Err(scripted_failure());
            }
            Ok(self.next_ref())
        }
        .boxed()
    }

    fn end_study_session(
        &self,
        session_id: String,
        request: EndStudySession,
    ) -> BoxFuture<'_, Result<SessionSummary, BackendError>> {
        async move {
            self.record(Call::EndStudy(session_id.clone(), request));
            if let Some(gate) = &self.end_gate {
                gate.notified().await;
            }
            if self.fail_end_study {
                return Err(scripted_failure());
            }
            Ok(SessionSummary(serde_json::json!({ "id": session_id })))
        }
        .boxed()
    }

    fn start_focus_session(
        &self,
        goal_id: String,
        request: StartFocusSession,
    ) -> BoxFuture<'_, Result<SessionRef, BackendError>> {
        async move {
            self.record(Call::StartFocus(goal_id, request));
            if self.fail_start_focus {
                return Err(scripted_failure());
            }
            Ok(self.next_ref())
        }
        .boxed()
    }

    fn end_focus_session(
        &self,
        focus_session_id: String,
        request: EndFocusSession,
    ) -> BoxFuture<'_, Result<(), BackendError>> {
        async move {
            self.record(Call::EndFocus(focus_session_id, request));
            if self.fail_end_focus {
                return Err(scripted_failure());
            }
            Ok(())
        }
        .boxed()
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }
}
