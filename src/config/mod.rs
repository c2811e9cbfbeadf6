use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Complete tagbus configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagbusConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub card: CardConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// BCON backend the REST client talks to
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_server_url() -> String {
    std::env::var("BCON_SERVER_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn default_user_agent() -> String {
    "BCON Network".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// Tag store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Buffered points per `watch()` receiver before it lags
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_broadcast_capacity() -> usize {
    1000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

/// Card reader polling.
///
/// Read by [`CardMonitor`](crate::card::CardMonitor), which an embedding
/// application starts with its own [`CardReader`](crate::card::CardReader)
/// driver. The `tagbus` binary bundles no driver.
#[derive(Debug, Clone, Deserialize)]
pub struct CardConfig {
    #[serde(default = "default_card_enabled")]
    pub enabled: bool,
    /// How long one wait for a reader state change may block (milliseconds)
    #[serde(default = "default_event_timeout_ms")]
    pub event_timeout_ms: u64,
}

fn default_card_enabled() -> bool {
    true
}

fn default_event_timeout_ms() -> u64 {
    1000
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            enabled: default_card_enabled(),
            event_timeout_ms: default_event_timeout_ms(),
        }
    }
}

/// Query API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:3030".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<TagbusConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    let config: TagbusConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
    Ok(config)
}
