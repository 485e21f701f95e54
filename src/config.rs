use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::network::SyncConfig;
use crate::network::sync::DEFAULT_POLL_INTERVAL;
use crate::ui::state::{
    DEFAULT_CURRENT_USER, DEFAULT_ECHO_MATCH_WINDOW, DEFAULT_SCROLL_THRESHOLD, ViewSettings,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/chat.json";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/message";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const MIN_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint_base_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub current_user: String,
    pub scroll_threshold: f32,
    pub local_echo: bool,
    pub echo_match_window_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint_base_url: DEFAULT_ENDPOINT.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            current_user: DEFAULT_CURRENT_USER.to_string(),
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            local_echo: false,
            echo_match_window_ms: DEFAULT_ECHO_MATCH_WINDOW.as_millis() as u64,
        }
    }
}

impl AppConfig {
    pub fn sync_config(&self) -> SyncConfig {
        let poll_interval_ms = if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            log::warn!(
                "poll_interval_ms {} is too small; using {MIN_POLL_INTERVAL_MS}",
                self.poll_interval_ms
            );
            MIN_POLL_INTERVAL_MS
        } else {
            self.poll_interval_ms
        };

        SyncConfig {
            poll_interval: Duration::from_millis(poll_interval_ms),
        }
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            current_user: self.current_user.clone(),
            scroll_threshold: self.scroll_threshold,
            local_echo: self.local_echo,
            echo_match_window: Duration::from_millis(self.echo_match_window_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                log::info!(
                    "Loaded config {}: endpoint {}, polling every {} ms",
                    path.display(),
                    config.endpoint_base_url,
                    config.poll_interval_ms
                );
                config
            }
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}
