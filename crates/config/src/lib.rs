//! Configuration loading and validation for Laozihao.
//!
//! Settings come from three layers, later layers winning:
//! 1. built-in defaults,
//! 2. an optional TOML file (`laozihao.toml` in the working directory, or a
//!    path given on the command line),
//! 3. environment variables, after `.env` has been loaded with `dotenvy`.
//!
//! The result is validated once at startup and then passed around immutably.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "laozihao.toml";

/// The root configuration structure.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    /// Bearer credential for the chat API. `None` disables chat.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Full URL of the chat completions endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model name sent upstream
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on a single upstream call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Directory holding `brands.json` and `timeline.json`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub sessions: SessionConfig,
}

fn default_api_url() -> String {
    "https://api.deepseek.com/v1/chat/completions".into()
}
fn default_model() -> String {
    "deepseek-chat".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("data_dir", &self.data_dir)
            .field("server", &self.server)
            .field("sessions", &self.sessions)
            .finish()
    }
}

/// Redact a secret for Debug output.
pub fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Static frontend served at `/` when the directory exists
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Turns kept per session (user and assistant each count as one)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Sessions kept in memory before the least recently used is evicted
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_history_limit() -> usize {
    10
}
fn default_max_sessions() -> usize {
    1_000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl AppConfig {
    /// Load configuration for the running process.
    ///
    /// Reads `.env` (if any), then `path` or [`DEFAULT_CONFIG_FILE`], then
    /// applies environment overrides:
    /// - `DEEPSEEK_API_KEY`, `DEEPSEEK_API_URL`, `DEEPSEEK_MODEL`
    /// - `HOST`, `PORT`, `STATIC_DIR`
    /// - `DATA_DIR`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", env_file.display());
        }

        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Overlay values from an environment lookup.
    ///
    /// Empty values are ignored, so `DEEPSEEK_API_KEY=` leaves chat disabled.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("DEEPSEEK_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = get("DEEPSEEK_API_URL") {
            self.api_url = url;
        }
        if let Some(model) = get("DEEPSEEK_MODEL") {
            self.model = model;
        }
        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT must be a port number, got {port:?}"))
            })?;
        }
        if let Some(dir) = get("STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }

        Ok(())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }
        if self.sessions.history_limit == 0 {
            return Err(ConfigError::ValidationError(
                "sessions.history_limit must be > 0".into(),
            ));
        }
        if self.sessions.max_sessions == 0 {
            return Err(ConfigError::ValidationError(
                "sessions.max_sessions must be > 0".into(),
            ));
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError("api_url must not be empty".into()));
        }
        Ok(())
    }

    /// Check if a chat API credential is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn brands_path(&self) -> PathBuf {
        self.data_dir.join("brands.json")
    }

    pub fn timeline_path(&self) -> PathBuf {
        self.data_dir.join("timeline.json")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            data_dir: default_data_dir(),
            server: ServerConfig::default(),
            sessions: SessionConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
