//! Application configuration loaded from environment variables.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Storage ===
    /// Path to the SQLite database file (":memory:" for an in-memory store).
    #[serde(default = "default_database_path")]
    pub database_path: String,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of pets per page on the list endpoint.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_database_path() -> String {
    "pets.db".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_page_size() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_path.is_empty() {
            return Err("DATABASE_PATH must not be empty".to_string());
        }

        if self.page_size == 0 {
            return Err("PAGE_SIZE must be at least 1".to_string());
        }

        Ok(())
    }

    /// Check if the store is purely in-memory.
    pub fn is_in_memory(&self) -> bool {
        self.database_path == ":memory:"
    }
}
