use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{API_BASE_URL, CHAT_POLL_INTERVAL, REQUEST_TIMEOUT, UNREAD_POLL_INTERVAL};

pub const ENV_API_URL: &str = "RETREND_API_URL";
pub const ENV_DATA_DIR: &str = "RETREND_DATA_DIR";

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub api_base_url: String,
    pub chat_poll_interval: Duration,
    pub unread_poll_interval: Duration,
    pub request_timeout: Duration,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            api_base_url: API_BASE_URL.to_string(),
            chat_poll_interval: CHAT_POLL_INTERVAL,
            unread_poll_interval: UNREAD_POLL_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    /// Default config with `RETREND_API_URL` / `RETREND_DATA_DIR` applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                config = config.with_api_base_url(url);
            }
        }
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        config
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Path of the persisted session file
    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join("retrend"))
            .unwrap_or_else(|| PathBuf::from("retrend_data"));
        Self::new(data_dir)
    }
}
