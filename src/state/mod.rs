//! State management module
//!
//! The timer state machine, the shared application state that owns it, and
//! the log of finished sessions.

pub mod app_state;
pub mod session_log;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use session_log::{EntryStatus, LogPatch, SessionLog, SessionLogEntry};
pub use timer_state::{
    PresetKey, SessionStart, StudyType, TickOutcome, TimerMode, TimerSettings, TimerSnapshot,
    TimerState,
};
