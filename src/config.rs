//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

use crate::services::SettingsStore;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "study-timer")]
#[command(about = "A state-managed study timer with WORK/BREAK cycles and backend session tracking")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Base URL of the study backend API
    #[arg(long, env = "STUDY_TIMER_BACKEND_URL", default_value = "http://localhost:8000/api")]
    pub backend_url: String,

    /// Bearer token sent with backend requests
    #[arg(long, env = "STUDY_TIMER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Directory holding the persisted timer settings
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Backend request timeout in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn settings_store(&self) -> SettingsStore {
        match &self.data_dir {
            Some(dir) => SettingsStore::new(dir),
            None => SettingsStore::default_location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_locally() {
        let config = Config::try_parse_from(["study-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn data_dir_selects_settings_file() {
        let config = Config::try_parse_from(["study-timer", "--data-dir", "/tmp/st", "-v"]).unwrap();
        assert_eq!(
            config.settings_store().path(),
            PathBuf::from("/tmp/st/timer-settings.json").as_path()
        );
        assert_eq!(config.log_level(), "debug");
    }
}
