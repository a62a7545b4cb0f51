//! Application configuration

use anyhow::{Context, Result};
use serde::Deserialize;

/// Application configuration loaded from `AREAFX_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP bridge port
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    /// SQLite URL for the standalone document store; in-memory when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// User recorded as the author of synthetic aura templates
    #[serde(default)]
    pub user_id: Option<uuid::Uuid>,

    /// Notifications retained for the host to poll
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
}

fn default_server_port() -> u16 {
    3000
}

fn default_notification_capacity() -> usize {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: default_server_port(),
            database_url: None,
            user_id: None,
            notification_capacity: default_notification_capacity(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("AREAFX").try_parsing(true))
            .build()
            .context("Failed to read AREAFX_* environment")?
            .try_deserialize()
            .context("Invalid AREAFX_* configuration")
    }
}
