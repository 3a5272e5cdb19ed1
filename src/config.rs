//! TOML configuration.
//!
//! Every section is optional; a missing file section falls back to its
//! defaults, and [`Config::default`] is used by commands that run without
//! a config file at all (`annotate`, `completions`).
//!
//! ```toml
//! [backend]
//! url = "http://127.0.0.1:8000"
//! chat_path = "/api/chat"
//! api_key_env = "CITEMARK_API_KEY"
//! timeout_secs = 30
//! max_retries = 3
//!
//! [server]
//! bind = "127.0.0.1:7341"
//!
//! [render]
//! format = "text"
//! expand_all = false
//! cache_capacity = 256
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::render::RenderFormat;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Chat backend exposing `sendMessage(text) -> {response, sources, citations}`.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL; `None` disables `citemark ask`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_chat_path")]
    pub chat_path: String,
    /// Name of the environment variable holding a bearer token.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            chat_path: default_chat_path(),
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_chat_path() -> String {
    "/api/chat".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub expand_all: bool,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            expand_all: false,
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_format() -> String {
    "text".to_string()
}
fn default_cache_capacity() -> usize {
    256
}

impl BackendConfig {
    /// Full URL of the chat endpoint, if a backend is configured.
    pub fn chat_url(&self) -> Option<String> {
        self.url.as_ref().map(|base| {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                self.chat_path.trim_start_matches('/')
            )
        })
    }
}

impl RenderConfig {
    pub fn render_format(&self) -> Result<RenderFormat> {
        self.format.parse()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate backend
    if let Some(url) = &config.backend.url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("backend.url must start with http:// or https://, got '{}'", url);
        }
    }
    if config.backend.timeout_secs == 0 {
        anyhow::bail!("backend.timeout_secs must be > 0");
    }

    // Validate render
    if config.render.cache_capacity == 0 {
        anyhow::bail!("render.cache_capacity must be > 0");
    }
    config
        .render
        .render_format()
        .with_context(|| "Invalid render.format")?;

    Ok(())
}
