//! Main application state management

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{
    session_log::{LogPatch, SessionLog, SessionLogEntry},
    timer_state::{PresetKey, SessionStart, StudyType, TickOutcome, TimerSnapshot, TimerState},
};
use crate::{
    error::TimerError,
    services::{EndFocusSession, EndStudySession, SettingsStore, StartFocusSession, StartStudySession, StudyBackend},
    utils::{rounded_minutes_between, Clock},
};

/// Owner of the study timer and everything it talks to
///
/// The timer lock is never held across a backend `.await`. A tick can land
/// while `start_session`/`end_session_sync` is waiting on the network; the
/// post-call mutation is then applied on top of whatever the tick left.
pub struct AppState {
    timer: Mutex<TimerState>,
    session_log: Mutex<SessionLog>,
    backend: Arc<dyn StudyBackend>,
    store: SettingsStore,
    clock: Arc<dyn Clock>,
    /// Set when durations came from (or were written to) the local store
    local_settings: AtomicBool,
    /// Serializes settings writes so the file always ends at the latest state
    persist_lock: Mutex<()>,
    /// Server metadata
    pub start_time: Instant,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
    /// Channel for timer updates
    timer_update_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _timer_update_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Build the state, seeding durations from the local store when present
    pub fn new(backend: Arc<dyn StudyBackend>, store: SettingsStore, clock: Arc<dyn Clock>) -> Self {
        let persisted = store.load();
        let timer = match persisted {
            Some(settings) => {
                info!(
                    "Using saved timer settings: focus={}min, break={}min, preset={}",
                    settings.focus_duration,
                    settings.break_duration,
                    settings.preset_key.as_str()
                );
                TimerState::with_settings(settings)
            }
            None => TimerState::new(),
        };
        let (timer_update_tx, timer_update_rx) = watch::channel(timer.snapshot());

        Self {
            timer: Mutex::new(timer),
            session_log: Mutex::new(SessionLog::new()),
            backend,
            store,
            clock,
            local_settings: AtomicBool::new(persisted.is_some()),
            persist_lock: Mutex::new(()),
            start_time: Instant::now(),
            last_action: Mutex::new(None),
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
        }
    }

    /// Lock the timer, apply `updater`, and publish the new snapshot
    fn apply<F, R>(&self, updater: F) -> Result<(R, TimerSnapshot), TimerError>
    where
        F: FnOnce(&mut TimerState) -> R,
    {
        let mut timer = self.timer.lock()
            .map_err(|e| TimerError::Lock(e.to_string()))?;

        let result = updater(&mut timer);
        let snapshot = timer.snapshot();
        drop(timer); // Release the lock early

        if let Err(e) = self.timer_update_tx.send(snapshot.clone()) {
            warn!("Failed to send timer update: {}", e);
        }

        Ok((result, snapshot))
    }

    /// Same as `apply`, recording `action` as the last user action
    pub fn update_timer<F, R>(&self, action: &str, updater: F) -> Result<(R, TimerSnapshot), TimerError>
    where
        F: FnOnce(&mut TimerState) -> R,
    {
        let outcome = self.apply(updater)?;
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), Utc::now()));
        }
        Ok(outcome)
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> Result<TimerState, TimerError> {
        self.timer.lock()
            .map(|timer| timer.clone())
            .map_err(|e| TimerError::Lock(e.to_string()))
    }

    pub fn snapshot(&self) -> Result<TimerSnapshot, TimerError> {
        self.get_timer_state().map(|timer| timer.snapshot())
    }

    /// Watch every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.timer_update_tx.subscribe()
    }

    /// Fetch default durations from the backend unless local settings exist
    pub async fn load_settings(&self) -> bool {
        if self.local_settings.load(Ordering::SeqCst) {
            debug!("Local timer settings present, skipping backend defaults");
            return false;
        }

        let settings = match self.backend.get_study_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load study settings, keeping defaults: {}", e);
                return false;
            }
        };

        // A local change may have landed while the request was in flight
        if self.local_settings.load(Ordering::SeqCst) {
            debug!("Local timer settings written during fetch, ignoring backend defaults");
            return false;
        }

        match self.apply(|timer| timer.apply_remote_defaults(settings.focus_duration, settings.break_duration)) {
            Ok((_, snapshot)) => {
                info!(
                    "Loaded study settings: focus={}min, break={}min",
                    snapshot.focus_duration, snapshot.break_duration
                );
                true
            }
            Err(e) => {
                error!("Failed to apply study settings: {}", e);
                false
            }
        }
    }

    /// Advance the countdown by one second
    pub fn tick(&self) -> Result<TickOutcome, TimerError> {
        let timer = self.timer.lock()
            .map_err(|e| TimerError::Lock(e.to_string()))?;
        if !timer.is_active {
            return Ok(TickOutcome::Idle);
        }
        drop(timer);

        self.apply(|timer| timer.tick()).map(|(outcome, _)| outcome)
    }

    /// Start a backend-tracked study session and set the timer running
    pub async fn start_session(
        &self,
        goal: String,
        goal_id: Option<String>,
        success_criteria: Option<String>,
    ) -> Result<TimerSnapshot, TimerError> {
        let study_type = self.get_timer_state()?.study_type;
        info!("Starting study session: goal={:?}, goal_id={:?}", goal, goal_id);

        let session = self
            .backend
            .start_study_session(StartStudySession {
                goal: goal.clone(),
                success_criteria,
                study_type,
            })
            .await
            .map_err(|e| {
                error!("Failed to start study session: {}", e);
                e
            })?;

        let focus_session_id = match &goal_id {
            Some(goal_id) => match self
                .backend
                .start_focus_session(goal_id.clone(), StartFocusSession { session_type: study_type })
                .await
            {
                Ok(focus) => Some(focus.id),
                Err(e) => {
                    warn!("Failed to start focus session for goal {}: {}", goal_id, e);
                    None
                }
            },
            None => None,
        };

        let start = SessionStart {
            session_id: session.id,
            goal,
            goal_id,
            focus_session_id,
            started_at: self.clock.now(),
        };
        let (_, snapshot) = self.update_timer("session-start", |timer| timer.begin_session(start))?;
        Ok(snapshot)
    }

    /// End the active session. `Ok(None)` when there was nothing to end.
    pub async fn end_session_sync(
        &self,
        reflection: String,
        rating: u8,
    ) -> Result<Option<TimerSnapshot>, TimerError> {
        let timer = self.get_timer_state()?;
        let Some(session_id) = timer.active_session_id.clone() else {
            debug!("No active study session to end");
            return Ok(None);
        };

        let pending = SessionLogEntry::pending(timer.goal.clone(), reflection.clone(), rating);
        let temp_key = pending.key.clone();
        self.patch_log(LogPatch::Insert(pending.clone()));

        let request = EndStudySession {
            reflection: reflection.clone(),
            effectiveness_rating: rating,
        };
        let summary = match self.backend.end_study_session(session_id.clone(), request).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Failed to end study session {}: {}", session_id, e);
                self.patch_log(LogPatch::Remove { key: temp_key });
                return Err(e.into());
            }
        };

        let elapsed_minutes = timer
            .session_start_time
            .map(|start| rounded_minutes_between(start, self.clock.now()));

        if let Some(focus_session_id) = timer.focus_session_id.clone() {
            let request = EndFocusSession {
                duration_minutes: elapsed_minutes.unwrap_or(0),
                notes: reflection,
            };
            if let Err(e) = self.backend.end_focus_session(focus_session_id.clone(), request).await {
                warn!("Failed to end focus session {}: {}", focus_session_id, e);
            }
        }

        let (_, snapshot) = self.update_timer("session-end", |timer| timer.finish_session())?;

        let confirmed = pending.confirmed(
            summary.id().unwrap_or(session_id),
            summary.duration_minutes().or(elapsed_minutes),
        );
        self.patch_log(LogPatch::Replace { key: temp_key, entry: confirmed });

        Ok(Some(snapshot))
    }

    pub fn toggle_play_pause(&self) -> Result<TimerSnapshot, TimerError> {
        let (active, snapshot) = self.update_timer("toggle", |timer| timer.toggle_play_pause())?;
        debug!("Timer {}", if active { "resumed" } else { "paused" });
        Ok(snapshot)
    }

    pub fn reset(&self) -> Result<TimerSnapshot, TimerError> {
        self.update_timer("reset", |timer| timer.reset())
            .map(|(_, snapshot)| snapshot)
    }

    /// Change study type. Refused with `StudyTypeLocked` while running.
    pub fn set_study_type(&self, study_type: StudyType) -> Result<TimerSnapshot, TimerError> {
        if self.get_timer_state()?.is_active {
            return Err(TimerError::StudyTypeLocked);
        }
        let (applied, snapshot) = self.update_timer("study-type", |timer| timer.set_study_type(study_type))?;
        if !applied {
            return Err(TimerError::StudyTypeLocked);
        }
        info!("Study type set to {}", study_type.as_str());
        Ok(snapshot)
    }

    pub fn set_focus_duration(&self, minutes: u32) -> Result<TimerSnapshot, TimerError> {
        let (_, snapshot) = self.update_timer("focus-duration", |timer| {
            timer.set_focus_duration(minutes);
        })?;
        self.persist();
        Ok(snapshot)
    }

    pub fn set_break_duration(&self, minutes: u32) -> Result<TimerSnapshot, TimerError> {
        let (_, snapshot) = self.update_timer("break-duration", |timer| {
            timer.set_break_duration(minutes);
        })?;
        self.persist();
        Ok(snapshot)
    }

    pub fn apply_preset(&self, preset: PresetKey) -> Result<TimerSnapshot, TimerError> {
        if preset.durations().is_none() {
            return Err(TimerError::InvalidPreset(preset.as_str().to_string()));
        }
        let (result, snapshot) = self.update_timer("preset", |timer| timer.apply_preset(preset))?;
        result?;
        info!("Applied preset {}", preset.as_str());
        self.persist();
        Ok(snapshot)
    }

    /// Finished sessions, newest first
    pub fn session_log(&self) -> Vec<SessionLogEntry> {
        self.session_log.lock()
            .map(|log| log.entries())
            .unwrap_or_default()
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, at)) => (Some(action), Some(at)),
            None => (None, None),
        }
    }

    fn patch_log(&self, patch: LogPatch) {
        match self.session_log.lock() {
            Ok(mut log) => {
                if !log.apply(patch) {
                    warn!("Session log patch targeted a missing entry");
                }
            }
            Err(e) => warn!("Failed to lock session log: {}", e),
        }
    }

    // Writes the settings as they are now, not as the caller saw them.
    // In-memory change stands even if the write fails.
    fn persist(&self) {
        self.local_settings.store(true, Ordering::SeqCst);
        let _guard = match self.persist_lock.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Failed to lock settings writer: {}", e);
                return;
            }
        };
        let settings = match self.get_timer_state() {
            Ok(timer) => timer.settings(),
            Err(e) => {
                error!("Failed to read timer settings for persistence: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.save(&settings) {
            error!("Failed to persist timer settings: {}", e);
        }
    }
}
