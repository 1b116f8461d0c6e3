//! External service module
//!
//! This module contains the study backend client and the local settings store.

pub mod backend;
pub mod http_backend;
pub mod settings_store;

// Re-export main types
pub use backend::*;
pub use http_backend::HttpStudyBackend;
pub use settings_store::SettingsStore;
