//! Configuration management for taskman.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `DATABASE_PATH` - Optional. SQLite database file. Defaults to `taskman.db`.
//! - `TASKMAN_STORE` - Optional. Storage backend, `sqlite` (default) or `memory`.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::TaskStoreType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Storage backend selection
    pub store_type: TaskStoreType,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port_raw = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let port: u16 = port_raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT".to_string(), port_raw.clone()))?;

        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("taskman.db"));

        let store_type = std::env::var("TASKMAN_STORE")
            .map(|s| TaskStoreType::parse(&s))
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            database_path,
            store_type,
        })
    }
}
