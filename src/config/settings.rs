//! Service settings and configuration types.
//!
//! Settings are read from `$REPLY_TRACKER_CONFIG` if set, otherwise from
//! `settings.json` in the platform config directory (e.g.
//! `~/.config/reply-tracker/settings.json`). A missing file yields defaults.
//! Environment variables listed on [`Settings::apply_env`] win over the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an explicit settings file.
pub const CONFIG_PATH_ENV: &str = "REPLY_TRACKER_CONFIG";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level service settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener.
    pub server: ServerSettings,
    /// SQLite database location.
    pub database: DatabaseSettings,
    /// Google OAuth client used to refresh access tokens.
    pub google: GoogleSettings,
    /// Gmail API endpoints.
    pub gmail: GmailSettings,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to bind, e.g. `127.0.0.1:3000`.
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path of the SQLite file.
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let path = project_dirs()
            .map(|dirs| dirs.data_dir().join("reply-tracker.db"))
            .unwrap_or_else(|| PathBuf::from("reply-tracker.db"));
        Self { path }
    }
}

/// Google OAuth client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    /// OAuth token endpoint.
    pub token_url: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
        }
    }
}

/// Gmail REST endpoints. Overridable so tests can point at a local server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GmailSettings {
    /// Base URL for `users/me` resources.
    pub api_base: String,
    /// Multipart batch endpoint.
    pub batch_url: String,
    /// Path prefix used inside batch sub-requests.
    pub batch_path_prefix: String,
}

impl Default for GmailSettings {
    fn default() -> Self {
        Self {
            api_base: "https://gmail.googleapis.com/gmail/v1/users/me".to_string(),
            batch_url: "https://gmail.googleapis.com/batch/gmail/v1".to_string(),
            batch_path_prefix: "/gmail/v1/users/me".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from the configured file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let path = env
            .get(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path);

        let mut settings = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        settings.apply_env(&env);
        Ok(settings)
    }

    /// Reads settings from a JSON file. Missing sections take defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Default settings file location.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Applies overrides from environment variables:
    /// `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `REPLY_TRACKER_BIND`,
    /// `REPLY_TRACKER_DATABASE`.
    pub fn apply_env(&mut self, env: &HashMap<String, String>) {
        if let Some(v) = env.get("GOOGLE_CLIENT_ID") {
            self.google.client_id = v.clone();
        }
        if let Some(v) = env.get("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = v.clone();
        }
        if let Some(v) = env.get("REPLY_TRACKER_BIND") {
            self.server.bind_address = v.clone();
        }
        if let Some(v) = env.get("REPLY_TRACKER_DATABASE") {
            self.database.path = PathBuf::from(v);
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "reply-tracker")
}
