//! # Server Configuration
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Default values                                                      │
//! │     127.0.0.1:8080, database in the platform data dir, page size 20,    │
//! │     sessions expire after 8 idle hours                                  │
//! │                                                                         │
//! │  2. Config file                                                         │
//! │     $MOSTRADOR_CONFIG, else                                             │
//! │     ~/.config/mostrador/mostrador.toml (Linux)                          │
//! │     ~/Library/Application Support/com.mostrador.mostrador/... (macOS)   │
//! │                                                                         │
//! │  3. Environment variables (highest priority)                            │
//! │     MOSTRADOR_BIND_ADDR, MOSTRADOR_PORT, MOSTRADOR_DB_PATH,             │
//! │     MOSTRADOR_STORE_NAME, MOSTRADOR_PAGE_SIZE,                          │
//! │     MOSTRADOR_SESSION_TTL_MINUTES                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```toml
//! # mostrador.toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//! session_ttl_minutes = 480
//!
//! [database]
//! path = "/var/lib/mostrador/mostrador.db"
//! max_connections = 5
//!
//! [store]
//! name = "Almacén San Martín"
//! currency_symbol = "$"
//! page_size = 20
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use mostrador_core::types::MAX_PAGE_SIZE;
use mostrador_core::{Money, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::state::DEFAULT_SESSION_TTL;

const CONFIG_FILE: &str = "mostrador.toml";
const DATABASE_FILE: &str = "mostrador.db";

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine the data directory")]
    NoDataDir,
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Idle minutes before a sale session is dropped.
    pub session_ttl_minutes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            session_ttl_minutes: DEFAULT_SESSION_TTL.as_secs() / 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `None` means the platform data directory.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: None,
            max_connections: 5,
        }
    }
}

/// Shop-facing settings, also served to the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub name: String,
    pub currency_symbol: String,
    /// Rows per page in listings.
    pub page_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            name: "Mostrador".to_string(),
            currency_symbol: "$".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Loads defaults, then the config file, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("MOSTRADOR_CONFIG")
            .ok()
            .map(PathBuf::from)
            .or_else(Self::default_config_path);

        Self::load_with(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an explicit file and variable lookup.
    pub fn load_with(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                info!(?path, "Loading config from file");
                Self::from_toml(&std::fs::read_to_string(path)?)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_env_overrides(
        &mut self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(addr) = env("MOSTRADOR_BIND_ADDR") {
            debug!(bind_addr = %addr, "Overriding bind address from environment");
            self.server.bind_addr = addr;
        }

        if let Some(port) = env("MOSTRADOR_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MOSTRADOR_PORT".to_string()))?;
        }

        if let Some(minutes) = env("MOSTRADOR_SESSION_TTL_MINUTES") {
            self.server.session_ttl_minutes = minutes.parse().map_err(|_| {
                ConfigError::InvalidValue("MOSTRADOR_SESSION_TTL_MINUTES".to_string())
            })?;
        }

        if let Some(path) = env("MOSTRADOR_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(name) = env("MOSTRADOR_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(size) = env("MOSTRADOR_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(size) => self.store.page_size = size,
                Err(_) => warn!(value = %size, "Ignoring unparsable MOSTRADOR_PAGE_SIZE"),
            }
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.server.session_ttl_minutes == 0 {
            return Err(ConfigError::InvalidValue("server.session_ttl_minutes".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue("database.max_connections".to_string()));
        }

        if self.store.page_size == 0 || self.store.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue("store.page_size".to_string()));
        }

        if self.store.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue("store.name".to_string()));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.bind_addr, self.server.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("server.bind_addr".to_string()))
    }

    /// Database file, creating the platform data directory when it is used.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs =
            ProjectDirs::from("com", "mostrador", "mostrador").ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join(DATABASE_FILE))
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.server.session_ttl_minutes.saturating_mul(60))
    }

    /// Amount with the store's currency symbol, as shown on cart totals.
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.store.currency_symbol)
    }

    fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "mostrador", "mostrador")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}
