//! Configuration management for the RAX filesystem server
//!
//! Values come from built-in defaults, an optional `config.toml`, and
//! `FS_EXPLORER_*` environment variables, in increasing priority.

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "FS_EXPLORER_CONFIG";
const ENV_PREFIX: &str = "FS_EXPLORER";
const DEFAULT_CONFIG_FILE: &str = "config";

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_STORAGE_ROOT: &str = "./storage";
const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Server configuration, fixed for the lifetime of the process
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the WebSocket listener
    pub bind_address: String,

    /// Port for the WebSocket listener
    pub port: u16,

    /// Directory exposed to clients as `/`
    pub storage_root: String,

    /// Largest inbound message accepted, in bytes
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            storage_root: DEFAULT_STORAGE_ROOT.to_string(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config.toml` (or `$FS_EXPLORER_CONFIG`) with
    /// environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from the given file (extension optional); a missing
    /// file falls back to defaults
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`ServerConfig::load_from`], reading `FS_EXPLORER_*` overrides
    /// from `env` instead of the process environment when given
    fn load_with_env(path: &str, env: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("storage_root", DEFAULT_STORAGE_ROOT)?
            .set_default("max_message_size", DEFAULT_MAX_MESSAGE_SIZE as i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).source(env))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.storage_root.trim().is_empty() {
            return Err(ConfigError::Message("storage_root cannot be empty".into()));
        }

        if self.max_message_size == 0 {
            return Err(ConfigError::Message(
                "max_message_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }
}
