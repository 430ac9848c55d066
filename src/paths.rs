//! Project path functions - single source of truth for all file paths.
//!
//! This module centralizes path definitions to avoid hardcoded strings
//! scattered throughout the codebase.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//! - `PORT`: Override the server port (see config.rs)
//!
//! This allows running multiple isolated server instances for E2E testing:
//! ```bash
//! DATA_DIR=data/test/a PORT=3001 cargo run
//! DATA_DIR=data/test/b PORT=3002 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database path (users, sessions, learning records, usage counters)
pub fn db_path() -> String {
    format!("{}/hantalk.db", data_dir())
}

/// Pre-authored lesson content directory
pub fn content_dir() -> String {
    format!("{}/content", data_dir())
}
