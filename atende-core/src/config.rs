use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::models::NotificationSettings;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AtendeConfig {
    pub logging: LoggingConfig,
    pub support: SupportConfig,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

/// Tunables for the conversation engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportConfig {
    /// Page size for the conversation-list feed.
    #[serde(default = "default_conversation_page_size")]
    pub conversation_page_size: usize,

    /// Page size for per-conversation message history.
    #[serde(default = "default_message_page_size")]
    pub message_page_size: usize,

    /// Delay between dismissing one achievement toast and showing the next.
    #[serde(default = "default_achievement_advance_ms")]
    pub achievement_advance_ms: u64,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            conversation_page_size: default_conversation_page_size(),
            message_page_size: default_message_page_size(),
            achievement_advance_ms: default_achievement_advance_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_conversation_page_size() -> usize {
    20
}

fn default_message_page_size() -> usize {
    30
}

fn default_achievement_advance_ms() -> u64 {
    300
}

impl AtendeConfig {
    /// Load configuration from files and environment.
    ///
    /// Sources, later ones overriding earlier ones:
    /// 1. `config/default.toml` and `config/local.toml` in the working dir
    /// 2. `atende.toml` in the working dir
    /// 3. `<config dir>/atende/config.toml`
    /// 4. `ATENDE_`-prefixed environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in get_config_paths() {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("ATENDE")
                .separator("__")
                .try_parsing(true),
        );

        let config: AtendeConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(ConfigLoadError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        if self.support.conversation_page_size == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "support.conversation_page_size".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.support.message_page_size == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "support.message_page_size".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }
}

/// Install the global tracing subscriber. Safe to call once per process;
/// subsequent calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.level)
        .unwrap_or_else(|_| EnvFilter::new(default_log_level()));

    if config.json_format {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init();
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("atende.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("atende").join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    if let Ok(cwd) = std::env::current_dir() {
        let _ = dotenvy::from_path(cwd.join(".env"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let _ = dotenvy::from_path(config_dir.join("atende").join(".env"));
    }
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("atende"))
}

pub fn get_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("atende"))
}

pub fn ensure_config_dir() -> Result<PathBuf, std::io::Error> {
    let config_dir = get_config_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine config directory",
        )
    })?;

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn ensure_data_dir() -> Result<PathBuf, std::io::Error> {
    let data_dir = get_data_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine data directory",
        )
    })?;

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}
