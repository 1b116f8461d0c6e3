//! Timer state structure and transitions
//!
//! `TimerState` is the WORK/BREAK countdown. Every method here is a pure
//! in-memory transition; I/O (backend calls, persistence) lives in
//! [`AppState`](super::AppState), which applies these after the fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimerError;

pub const FOCUS_MIN_MINUTES: u32 = 10;
pub const FOCUS_MAX_MINUTES: u32 = 120;
pub const BREAK_MIN_MINUTES: u32 = 3;
pub const BREAK_MAX_MINUTES: u32 = 30;
pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Current phase of the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimerMode {
    Work,
    Break,
}

/// How the WORK phase is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyType {
    /// Full focus duration
    #[default]
    Deep,
    /// 60% of the focus duration
    Practice,
}

impl StudyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyType::Deep => "deep",
            StudyType::Practice => "practice",
        }
    }

    /// WORK phase length in minutes for a given focus duration
    pub fn work_minutes(&self, focus_minutes: u32) -> u32 {
        match self {
            StudyType::Deep => focus_minutes,
            // round(focus * 0.6) in integer arithmetic
            StudyType::Practice => (focus_minutes * 6 + 5) / 10,
        }
    }
}

/// Named focus/break pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKey {
    #[default]
    Classic,
    Extended,
    Deep,
    Custom,
}

impl PresetKey {
    /// (focus, break) minutes, `None` for `Custom`
    pub fn durations(&self) -> Option<(u32, u32)> {
        match self {
            PresetKey::Classic => Some((25, 5)),
            PresetKey::Extended => Some((50, 10)),
            PresetKey::Deep => Some((90, 20)),
            PresetKey::Custom => None,
        }
    }

    /// The named preset with exactly these durations, else `Custom`
    pub fn matching(focus_minutes: u32, break_minutes: u32) -> Self {
        [PresetKey::Classic, PresetKey::Extended, PresetKey::Deep]
            .into_iter()
            .find(|preset| preset.durations() == Some((focus_minutes, break_minutes)))
            .unwrap_or(PresetKey::Custom)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetKey::Classic => "classic",
            PresetKey::Extended => "extended",
            PresetKey::Deep => "deep",
            PresetKey::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "classic" => Some(PresetKey::Classic),
            "extended" => Some(PresetKey::Extended),
            "deep" => Some(PresetKey::Deep),
            "custom" => Some(PresetKey::Custom),
            _ => None,
        }
    }
}

/// The user-tunable part of the timer that gets persisted locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub focus_duration: u32,
    pub break_duration: u32,
    #[serde(default)]
    pub preset_key: PresetKey,
}

impl TimerSettings {
    /// Same settings with both durations pulled into range
    pub fn clamped(self) -> Self {
        Self {
            focus_duration: clamp_focus(self.focus_duration),
            break_duration: clamp_break(self.break_duration),
            preset_key: self.preset_key,
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_duration: DEFAULT_FOCUS_MINUTES,
            break_duration: DEFAULT_BREAK_MINUTES,
            preset_key: PresetKey::Classic,
        }
    }
}

pub fn clamp_focus(minutes: u32) -> u32 {
    minutes.clamp(FOCUS_MIN_MINUTES, FOCUS_MAX_MINUTES)
}

pub fn clamp_break(minutes: u32) -> u32 {
    minutes.clamp(BREAK_MIN_MINUTES, BREAK_MAX_MINUTES)
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer paused, nothing changed
    Idle,
    /// One second counted down
    Counted,
    /// Countdown hit zero and the timer moved into the given phase
    PhaseChanged(TimerMode),
}

/// Values recorded once the backend has accepted a new study session
#[derive(Debug, Clone)]
pub struct SessionStart {
    pub session_id: String,
    pub goal: String,
    pub goal_id: Option<String>,
    pub focus_session_id: Option<String>,
    pub started_at: DateTime<Utc>,
}

/// Study timer state
#[derive(Debug, Clone, PartialEq)]
pub struct TimerState {
    pub time_left: u32,
    pub is_active: bool,
    pub mode: TimerMode,
    pub study_type: StudyType,
    pub session_count: u32,
    pub focus_duration: u32,
    pub break_duration: u32,
    pub preset_key: PresetKey,
    pub active_session_id: Option<String>,
    pub focus_session_id: Option<String>,
    pub goal: Option<String>,
    pub selected_goal_id: Option<String>,
    pub session_start_time: Option<DateTime<Utc>>,
}

impl TimerState {
    /// Create a paused WORK timer with default durations
    pub fn new() -> Self {
        Self::with_settings(TimerSettings::default())
    }

    /// Create a paused WORK timer from (possibly persisted) settings
    pub fn with_settings(settings: TimerSettings) -> Self {
        let settings = settings.clamped();
        Self {
            time_left: settings.focus_duration * 60,
            is_active: false,
            mode: TimerMode::Work,
            study_type: StudyType::Deep,
            session_count: 0,
            focus_duration: settings.focus_duration,
            break_duration: settings.break_duration,
            preset_key: settings.preset_key,
            active_session_id: None,
            focus_session_id: None,
            goal: None,
            selected_goal_id: None,
            session_start_time: None,
        }
    }

    pub fn settings(&self) -> TimerSettings {
        TimerSettings {
            focus_duration: self.focus_duration,
            break_duration: self.break_duration,
            preset_key: self.preset_key,
        }
    }

    /// WORK phase length in seconds under the current study type
    pub fn work_duration_seconds(&self) -> u32 {
        self.study_type.work_minutes(self.focus_duration) * 60
    }

    pub fn break_duration_seconds(&self) -> u32 {
        self.break_duration * 60
    }

    /// Full length of the current phase in seconds
    pub fn phase_duration_seconds(&self) -> u32 {
        match self.mode {
            TimerMode::Work => self.work_duration_seconds(),
            TimerMode::Break => self.break_duration_seconds(),
        }
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_active {
            return TickOutcome::Idle;
        }

        if self.time_left > 0 {
            self.time_left -= 1;
        }
        if self.time_left > 0 {
            return TickOutcome::Counted;
        }

        // Zero reached: switch phase and wait for the user to resume
        self.is_active = false;
        match self.mode {
            TimerMode::Work => {
                self.mode = TimerMode::Break;
                self.session_count += 1;
                self.time_left = self.break_duration_seconds();
            }
            TimerMode::Break => {
                self.mode = TimerMode::Work;
                self.time_left = self.work_duration_seconds();
            }
        }
        TickOutcome::PhaseChanged(self.mode)
    }

    /// Flip running/paused, returning the new value
    pub fn toggle_play_pause(&mut self) -> bool {
        self.is_active = !self.is_active;
        self.is_active
    }

    /// Back to a paused, full-length WORK phase. Session fields are kept.
    pub fn reset(&mut self) {
        self.is_active = false;
        self.mode = TimerMode::Work;
        self.time_left = self.work_duration_seconds();
    }

    /// Change the study type; refused while running
    pub fn set_study_type(&mut self, study_type: StudyType) -> bool {
        if self.is_active {
            return false;
        }
        self.study_type = study_type;
        self.time_left = self.work_duration_seconds();
        true
    }

    /// Store a clamped focus duration, returning the stored value
    pub fn set_focus_duration(&mut self, minutes: u32) -> u32 {
        self.store_focus(minutes);
        self.preset_key = PresetKey::Custom;
        self.focus_duration
    }

    /// Store a clamped break duration, returning the stored value
    pub fn set_break_duration(&mut self, minutes: u32) -> u32 {
        self.store_break(minutes);
        self.preset_key = PresetKey::Custom;
        self.break_duration
    }

    /// Switch to a named preset. `Custom` has no durations and is rejected.
    pub fn apply_preset(&mut self, preset: PresetKey) -> Result<(), TimerError> {
        let (focus, brk) = preset
            .durations()
            .ok_or_else(|| TimerError::InvalidPreset(preset.as_str().to_string()))?;
        self.store_focus(focus);
        self.store_break(brk);
        self.preset_key = preset;
        Ok(())
    }

    /// Take durations fetched from the backend settings endpoint
    pub fn apply_remote_defaults(&mut self, focus_minutes: u32, break_minutes: u32) {
        self.focus_duration = clamp_focus(focus_minutes);
        self.break_duration = clamp_break(break_minutes);
        self.preset_key = PresetKey::matching(self.focus_duration, self.break_duration);
        if !self.is_active {
            self.time_left = self.phase_duration_seconds();
        }
    }

    /// Record a session the backend accepted and start counting
    pub fn begin_session(&mut self, start: SessionStart) {
        self.active_session_id = Some(start.session_id);
        self.goal = Some(start.goal);
        self.selected_goal_id = start.goal_id;
        self.focus_session_id = start.focus_session_id;
        self.session_start_time = Some(start.started_at);
        self.is_active = true;
    }

    /// Drop all session correlation and return to a fresh WORK phase
    pub fn finish_session(&mut self) {
        self.active_session_id = None;
        self.focus_session_id = None;
        self.selected_goal_id = None;
        self.session_start_time = None;
        self.goal = None;
        self.is_active = false;
        self.mode = TimerMode::Work;
        self.time_left = self.work_duration_seconds();
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            time_left: self.time_left,
            is_active: self.is_active,
            mode: self.mode,
            study_type: self.study_type,
            session_count: self.session_count,
            focus_duration: self.focus_duration,
            break_duration: self.break_duration,
            preset_key: self.preset_key,
            active_session_id: self.active_session_id.clone(),
            focus_session_id: self.focus_session_id.clone(),
            goal: self.goal.clone(),
            selected_goal_id: self.selected_goal_id.clone(),
            session_start_time: self.session_start_time,
            work_duration_seconds: self.work_duration_seconds(),
            phase_duration_seconds: self.phase_duration_seconds(),
        }
    }

    fn store_focus(&mut self, minutes: u32) {
        self.focus_duration = clamp_focus(minutes);
        if !self.is_active && self.mode == TimerMode::Work {
            self.time_left = self.work_duration_seconds();
        }
    }

    fn store_break(&mut self, minutes: u32) {
        self.break_duration = clamp_break(minutes);
        if !self.is_active && self.mode == TimerMode::Break {
            self.time_left = self.break_duration_seconds();
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of the timer handed to API clients and watchers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub time_left: u32,
    pub is_active: bool,
    pub mode: TimerMode,
    pub study_type: StudyType,
    pub session_count: u32,
    pub focus_duration: u32,
    pub break_duration: u32,
    pub preset_key: PresetKey,
    pub active_session_id: Option<String>,
    pub focus_session_id: Option<String>,
    pub goal: Option<String>,
    pub selected_goal_id: Option<String>,
    pub session_start_time: Option<DateTime<Utc>>,
    pub work_duration_seconds: u32,
    pub phase_duration_seconds: u32,
}
