use crate::error::ConfigError;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub collections: CollectionSettings,
    pub log: LogSettings,
}

/// Where the HTTP listener binds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

/// Connection info for the document store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    /// The database holding every collection.
    pub name: String,
    pub username: String,
    pub password: Option<String>,
    /// How long establishing a connection may take before the dial fails.
    pub dial_timeout_secs: u64,
    pub max_connections: u32,
}

/// The collection each entity is stored in.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    pub customer: String,
    pub cliente: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Settings {
    /// Rejects settings the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.host must not be empty".to_string(),
            ));
        }
        if self.database.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.name must not be empty".to_string(),
            ));
        }
        if self.database.dial_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "database.dial_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be greater than zero".to_string(),
            ));
        }
        for (key, name) in [
            ("collections.customer", &self.collections.customer),
            ("collections.cliente", &self.collections.cliente),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{key} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

impl DatabaseSettings {
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }
}

// --- Default Implementations ---
// Every section may be omitted from the toml file.

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "gettyio".to_string(),
            username: "postgres".to_string(),
            password: None,
            dial_timeout_secs: 60,
            max_connections: 10,
        }
    }
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            customer: "Customer".to_string(),
            cliente: "Cliente".to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
