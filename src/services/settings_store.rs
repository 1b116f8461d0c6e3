//! Local persistence of timer durations and preset

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{error::SettingsError, state::TimerSettings};

/// File name inside the data directory
pub const SETTINGS_FILE: &str = "timer-settings.json";

/// Durable key-value slot for [`TimerSettings`]
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SETTINGS_FILE),
        }
    }

    /// Store under the platform config directory, falling back to the working directory
    pub fn default_location() -> Self {
        let dir = dirs::config_dir()
            .map(|dir| dir.join("study-timer"))
            .unwrap_or_else(|| PathBuf::from(".study-timer"));
        Self::new(&dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read saved settings. `None` if nothing has been saved or the file is unreadable.
    pub fn load(&self) -> Option<TimerSettings> {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring timer settings at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn try_load(&self) -> Result<Option<TimerSettings>, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let settings: TimerSettings = serde_json::from_str(&content)?;
        debug!("Loaded timer settings from {}", self.path.display());
        Ok(Some(settings.clamped()))
    }

    /// Write settings atomically (temp file in the same directory, then rename)
    pub fn save(&self, settings: &TimerSettings) -> Result<(), SettingsError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let content = serde_json::to_string_pretty(settings)?;
        let mut temp_file = NamedTempFile::new_in(dir)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(&self.path).map_err(|e| e.error)?;

        debug!("Saved timer settings to {}", self.path.display());
        Ok(())
    }
}
