//! Application configuration.
//!
//! Values resolve with priority: config.toml > environment (.env) > default.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::paths;

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    content: Option<ContentConfig>,
    limits: Option<HashMap<String, i64>>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentConfig {
    dir: Option<String>,
}

fn read_config_file() -> Option<AppConfig> {
    let contents = std::fs::read_to_string("config.toml").ok()?;
    match toml::from_str::<AppConfig>(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Ignoring malformed config.toml: {}", e);
            None
        }
    }
}

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    if let Some(config) = read_config_file() {
        if let Some(path) = config.database.and_then(|db| db.path) {
            tracing::info!("Using database from config.toml: {}", path);
            return PathBuf::from(path);
        }
    }

    if let Ok(path) = std::env::var("DATABASE_PATH") {
        tracing::info!("Using database from DATABASE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    PathBuf::from(paths::db_path())
}

/// Load lesson content directory with priority: config.toml > .env > default
pub fn load_content_dir() -> PathBuf {
    let _ = dotenvy::dotenv();

    if let Some(config) = read_config_file() {
        if let Some(dir) = config.content.and_then(|c| c.dir) {
            tracing::info!("Using content dir from config.toml: {}", dir);
            return PathBuf::from(dir);
        }
    }

    if let Ok(dir) = std::env::var("CONTENT_DIR") {
        tracing::info!("Using content dir from CONTENT_DIR env: {}", dir);
        return PathBuf::from(dir);
    }

    PathBuf::from(paths::content_dir())
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port (override with PORT env var)
pub const SERVER_PORT: u16 = 3000;

/// Get the full server bind address
pub fn server_bind_addr() -> String {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(SERVER_PORT);
    format!("{}:{}", SERVER_ADDR, port)
}

// ==================== Session Configuration ====================

/// Session expiration time in hours (1 week)
pub const SESSION_EXPIRY_HOURS: i64 = 24 * 7;

/// Probability threshold for expired-session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session validation
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

// ==================== Usage Limits ====================

/// Daily request allowance for request types not listed in config.toml
pub const DEFAULT_USAGE_LIMIT: i64 = 10;

/// Per-request-type usage limits over one UTC-day window.
#[derive(Debug, Clone)]
pub struct UsageLimits {
    per_type: HashMap<String, i64>,
    default_limit: i64,
}

impl UsageLimits {
    pub fn new(per_type: HashMap<String, i64>, default_limit: i64) -> Self {
        Self {
            per_type,
            default_limit,
        }
    }

    /// Limit for a request type, falling back to the default for unknown types
    pub fn limit_for(&self, request_type: &str) -> i64 {
        self.per_type
            .get(request_type)
            .copied()
            .unwrap_or(self.default_limit)
    }
}

impl Default for UsageLimits {
    fn default() -> Self {
        Self::new(HashMap::new(), DEFAULT_USAGE_LIMIT)
    }
}

/// Load usage limits from the `[limits]` table of config.toml.
///
/// The reserved key `default` overrides the fallback limit for
/// request types without an explicit entry.
pub fn load_usage_limits() -> UsageLimits {
    let mut per_type = read_config_file()
        .and_then(|config| config.limits)
        .unwrap_or_default();
    let default_limit = per_type.remove("default").unwrap_or(DEFAULT_USAGE_LIMIT);
    UsageLimits::new(per_type, default_limit)
}
