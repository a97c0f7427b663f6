use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::context::ContextKey;
use crate::core::error::ConfigError;

/// How a lazily created session gets its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// "2025-03-14 09:26:53", disambiguated with " (n)" on collision.
    Timestamp,
    /// First 20 characters of the opening message, ellipsis when truncated.
    FirstMessage,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self::Timestamp
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Context selected at startup.
    #[serde(default)]
    pub default_context: ContextKey,

    #[serde(default)]
    pub naming: NamingPolicy,

    /// Persist sessions to the SQLite archive.
    #[serde(default = "default_archive")]
    pub archive: bool,

    #[serde(default)]
    pub debug: bool,
}

fn default_working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_data_dir() -> String {
    ".brainbot".into()
}

fn default_archive() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            data_dir: default_data_dir(),
            default_context: ContextKey::default(),
            naming: NamingPolicy::default(),
            archive: default_archive(),
            debug: false,
        }
    }
}

impl AppConfig {
    pub fn data_path(&self) -> PathBuf {
        self.working_dir.join(&self.data_dir)
    }
}

pub fn load_config(working_dir: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let wd = working_dir.unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let mut config = AppConfig {
        working_dir: wd.clone(),
        ..Default::default()
    };

    // Global config, then local project config on top.
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("brainbot").join("config.json");
        if global_path.exists() {
            merge_file(&mut config, &global_path)?;
        }
    }

    let local_path = wd.join("brainbot.json");
    if local_path.exists() {
        merge_file(&mut config, &local_path)?;
    }

    if let Ok(key) = std::env::var("BRAINBOT_CONTEXT") {
        if let Some(context) = ContextKey::parse(&key) {
            config.default_context = context;
        }
    }

    Ok(config)
}

fn merge_file(base: &mut AppConfig, path: &std::path::Path) -> Result<(), ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::File(e.to_string()))?;
    let overlay: AppConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    merge_config(base, overlay);
    Ok(())
}

fn merge_config(base: &mut AppConfig, overlay: AppConfig) {
    if overlay.data_dir != default_data_dir() {
        base.data_dir = overlay.data_dir;
    }
    if overlay.default_context != ContextKey::default() {
        base.default_context = overlay.default_context;
    }
    if overlay.naming != NamingPolicy::default() {
        base.naming = overlay.naming;
    }
    if !overlay.archive {
        base.archive = false;
    }
    if overlay.debug {
        base.debug = true;
    }
}
