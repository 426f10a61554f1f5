// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is stored in `config.toml` inside the config directory
//! (`$SMARK_CONFIG_DIR`, else `<platform config dir>/smark`) and includes:
//! - `url` and `anon_key`: the hosted project to talk to
//! - `provider` and `redirect_to`: how sign-in is started
//! - `[realtime]`: change-feed channel, heartbeat and reconnect policy
//!
//! `SMARK_URL` and `SMARK_ANON_KEY` override the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::remote::{websocket_url, Backoff, HttpSettings, RealtimeSettings};

const CONFIG_DIR_NAME: &str = "smark";
const CONFIG_FILE_NAME: &str = "config.toml";
const CREDENTIALS_FILE_NAME: &str = "session.json";

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the hosted project, e.g. `https://abc.supabase.co`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Public (anon) API key of the project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
    /// OAuth provider used by `smark login` (default: "google").
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Where the provider sends the browser after sign-in (default: "http://localhost:3000").
    #[serde(default = "default_redirect_to")]
    pub redirect_to: String,
    /// HTTP request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub realtime: RealtimeConfig,
}

/// Change-feed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Channel name for the bookmark subscription (default: "realtime-bookmarks").
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Heartbeat interval in milliseconds (default: 30000).
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// Max time to wait for a channel join in seconds (default: 10).
    #[serde(default = "default_join_timeout_secs")]
    pub join_timeout_secs: u64,
    /// Maximum reconnection attempts before giving up (default: 10).
    #[serde(default = "default_reconnect_max_retries")]
    pub reconnect_max_retries: u32,
    /// Initial reconnect delay in milliseconds (default: 100).
    #[serde(default = "default_reconnect_initial_delay_ms")]
    pub reconnect_initial_delay_ms: u64,
    /// Maximum delay between reconnection attempts in seconds (default: 30).
    #[serde(default = "default_reconnect_max_delay_secs")]
    pub reconnect_max_delay_secs: u64,
}

fn default_provider() -> String {
    "google".to_string()
}

fn default_redirect_to() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_channel() -> String {
    "realtime-bookmarks".to_string()
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

fn default_join_timeout_secs() -> u64 {
    10
}

fn default_reconnect_max_retries() -> u32 {
    10
}

fn default_reconnect_initial_delay_ms() -> u64 {
    100
}

fn default_reconnect_max_delay_secs() -> u64 {
    30
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        RealtimeConfig {
            channel: default_channel(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            join_timeout_secs: default_join_timeout_secs(),
            reconnect_max_retries: default_reconnect_max_retries(),
            reconnect_initial_delay_ms: default_reconnect_initial_delay_ms(),
            reconnect_max_delay_secs: default_reconnect_max_delay_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: None,
            anon_key: None,
            provider: default_provider(),
            redirect_to: default_redirect_to(),
            request_timeout_secs: default_request_timeout_secs(),
            realtime: RealtimeConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `config_dir`. A missing file yields defaults.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Loads from the default directory and applies environment overrides.
    pub fn load_default() -> Result<Self> {
        let config = Config::load(&config_dir())?;
        Ok(config.with_overrides(env::project_url(), env::anon_key()))
    }

    /// Replaces `url` and `anon_key` with any provided values.
    pub fn with_overrides(mut self, url: Option<String>, anon_key: Option<String>) -> Self {
        if url.is_some() {
            self.url = url;
        }
        if anon_key.is_some() {
            self.anon_key = anon_key;
        }
        self
    }

    /// Saves configuration to `config_dir`, creating it if needed.
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        fs::create_dir_all(config_dir)?;
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// HTTP settings for the configured project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] when the URL or key is missing.
    pub fn http_settings(&self) -> Result<HttpSettings> {
        let url = self.url.clone().ok_or_else(|| not_configured("project URL", "SMARK_URL", "url"))?;
        let anon_key = self
            .anon_key
            .clone()
            .ok_or_else(|| not_configured("anon key", "SMARK_ANON_KEY", "anon_key"))?;
        Ok(HttpSettings {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }

    /// Change-feed settings for the configured project, without a session token.
    pub fn realtime_settings(&self) -> Result<RealtimeSettings> {
        let http = self.http_settings()?;
        let rt = &self.realtime;
        Ok(RealtimeSettings {
            url: websocket_url(&http.url, &http.anon_key),
            heartbeat: Duration::from_millis(rt.heartbeat_interval_ms.max(1)),
            join_timeout: Duration::from_secs(rt.join_timeout_secs),
            backoff: Backoff {
                max_retries: rt.reconnect_max_retries,
                initial_delay_ms: rt.reconnect_initial_delay_ms,
                max_delay_secs: rt.reconnect_max_delay_secs,
            },
        })
    }
}

fn not_configured(setting: &'static str, env: &'static str, key: &'static str) -> Error {
    Error::NotConfigured {
        setting,
        env,
        key,
        path: config_dir().join(CONFIG_FILE_NAME).display().to_string(),
    }
}

/// Directory holding `config.toml` and the saved session.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = env::config_dir() {
        return dir;
    }
    dirs::config_dir()
        .map(|d| d.join(CONFIG_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(".smark"))
}

/// Path of the saved session inside `config_dir`.
pub fn credentials_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CREDENTIALS_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
