//! Study Timer - A state-managed WORK/BREAK study timer service
//!
//! This library provides the timer state machine, its correlation with
//! backend-tracked study and focus sessions, local persistence of durations,
//! and an HTTP API for driving it from a UI.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use error::{BackendError, TimerError};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
