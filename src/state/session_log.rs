//! Log of finished study sessions
//!
//! Entries are written optimistically: a placeholder keyed `temp-<uuid>` goes
//! in before the backend call, then gets replaced by the confirmed entry or
//! removed again. Each step is a [`LogPatch`] applied through [`SessionLog::apply`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Oldest entries are dropped past this length
pub const SESSION_LOG_CAPACITY: usize = 50;

const TEMP_KEY_PREFIX: &str = "temp-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLogEntry {
    pub key: String,
    pub goal: Option<String>,
    pub reflection: String,
    pub rating: u8,
    pub duration_minutes: Option<i64>,
    pub status: EntryStatus,
}

impl SessionLogEntry {
    /// Placeholder for a session whose end call is still in flight
    pub fn pending(goal: Option<String>, reflection: String, rating: u8) -> Self {
        Self {
            key: format!("{}{}", TEMP_KEY_PREFIX, Uuid::new_v4()),
            goal,
            reflection,
            rating,
            duration_minutes: None,
            status: EntryStatus::Pending,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.key.starts_with(TEMP_KEY_PREFIX)
    }

    /// The confirmed form of this placeholder under the backend's key
    pub fn confirmed(&self, key: String, duration_minutes: Option<i64>) -> Self {
        Self {
            key,
            duration_minutes,
            status: EntryStatus::Confirmed,
            ..self.clone()
        }
    }
}

/// A single change to the log
#[derive(Debug, Clone, PartialEq)]
pub enum LogPatch {
    Insert(SessionLogEntry),
    Replace { key: String, entry: SessionLogEntry },
    Remove { key: String },
}

#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    entries: VecDeque<SessionLogEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a patch. Returns false when the targeted key is not present.
    pub fn apply(&mut self, patch: LogPatch) -> bool {
        match patch {
            LogPatch::Insert(entry) => {
                self.entries.push_front(entry);
                self.entries.truncate(SESSION_LOG_CAPACITY);
                true
            }
            LogPatch::Replace { key, entry } => match self.position(&key) {
                Some(index) => {
                    self.entries[index] = entry;
                    true
                }
                None => false,
            },
            LogPatch::Remove { key } => match self.position(&key) {
                Some(index) => {
                    self.entries.remove(index);
                    true
                }
                None => false,
            },
        }
    }

    /// Newest first
    pub fn entries(&self) -> Vec<SessionLogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }
}
