use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/backend.json";

/// Environment variables that override the config file (loaded via dotenvy).
pub const ENV_BASE_URL: &str = "CHAT_BASE_URL";
pub const ENV_ANON_KEY: &str = "CHAT_ANON_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the managed backend, e.g. `https://myproject.example.co`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Public (anonymous) API key sent with every request.
    #[serde(default)]
    pub anon_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            anon_key: String::new(),
        }
    }
}

fn default_base_url() -> String {
    // Local development stack default
    "http://127.0.0.1:54321".to_string()
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
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

/// Environment beats file, so a checked-in config can be pointed at a
/// different project without editing it.
pub fn apply_env_overrides(config: AppConfig) -> AppConfig {
    with_overrides(config, env_var(ENV_BASE_URL), env_var(ENV_ANON_KEY))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn with_overrides(
    mut config: AppConfig,
    base_url: Option<String>,
    anon_key: Option<String>,
) -> AppConfig {
    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    if let Some(anon_key) = anon_key {
        config.anon_key = anon_key;
    }
    config
}
