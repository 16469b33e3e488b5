//! Configuration management for Flower Stock Management
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FSM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{
    validate_validity_days, LocalClock, DEFAULT_NEAR_EXPIRY_DAYS, DEFAULT_UTC_OFFSET_HOURS,
    DEFAULT_VALIDITY_DAYS,
};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Stock lifecycle settings
    pub inventory: InventoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct InventoryConfig {
    /// Days a new batch stays valid after harvest
    pub validity_days: i32,

    /// Local time offset from UTC, in hours
    pub utc_offset_hours: i32,

    /// Days-remaining threshold for near-expiry alerts
    pub near_expiry_days: i64,
}

impl InventoryConfig {
    pub fn clock(&self) -> Result<LocalClock, ConfigError> {
        LocalClock::new(self.utc_offset_hours).map_err(|msg| {
            ConfigError::Message(format!("inventory.utc_offset_hours = {}: {}", self.utc_offset_hours, msg))
        })
    }

    /// Reject settings that would make expiry judgements meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_validity_days(self.validity_days)
            .map_err(|msg| ConfigError::Message(format!("inventory.validity_days: {}", msg)))?;
        if self.near_expiry_days < 0 {
            return Err(ConfigError::Message(
                "inventory.near_expiry_days cannot be negative".to_string(),
            ));
        }
        self.clock()?;
        Ok(())
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            validity_days: DEFAULT_VALIDITY_DAYS,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            near_expiry_days: DEFAULT_NEAR_EXPIRY_DAYS,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FSM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("inventory.validity_days", i64::from(DEFAULT_VALIDITY_DAYS))?
            .set_default("inventory.utc_offset_hours", i64::from(DEFAULT_UTC_OFFSET_HOURS))?
            .set_default("inventory.near_expiry_days", DEFAULT_NEAR_EXPIRY_DAYS)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FSM_ prefix)
            .add_source(
                Environment::with_prefix("FSM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.inventory.validate()?;

        Ok(config)
    }
}
