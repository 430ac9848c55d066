pub mod profile;
pub mod progress;
pub mod schema;
pub mod settings;
pub mod usage;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use schema::run_migrations;
pub use usage::UsageSummary;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
    /// Log the error at warn level and return the default
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }

    fn log_warn_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                T::default()
            }
        }
    }
}

/// Error returned when the database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Database unavailable")
    }
}

impl std::error::Error for DbLockError {}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
    pool.lock().map_err(|_: PoisonError<_>| {
        tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
        DbLockError
    })
}

pub fn init_db(path: &Path) -> rusqlite::Result<DbPool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    // Create backup before migrations if database exists
    if path.exists() {
        let backup_path = path.with_extension("db.backup");
        if let Err(e) = std::fs::copy(path, &backup_path) {
            tracing::warn!("Could not create database backup: {}", e);
        }
    }

    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    schema::run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Error surface of the identity-scoped record layer.
///
/// `Rejected` marks an update whose merged result is not a valid record
/// (caller error); everything else is a store/infrastructure failure.
#[derive(Debug)]
pub enum StoreError {
    Db(rusqlite::Error),
    Corrupt {
        table: &'static str,
        detail: String,
    },
    Rejected(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Db(e) => write!(f, "database error: {}", e),
            StoreError::Corrupt { table, detail } => {
                write!(f, "stored {} record is unreadable: {}", table, detail)
            }
            StoreError::Rejected(msg) => write!(f, "update rejected: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Db(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Db(e)
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Load a user's JSON document from one of the per-entity tables.
///
/// `table` is always a compile-time constant, never request input.
pub(crate) fn load_document(
    conn: &Connection,
    table: &'static str,
    user_id: i64,
) -> StoreResult<Option<Map<String, Value>>> {
    let raw: Option<String> = conn
        .query_row(
            &format!("SELECT data FROM {} WHERE user_id = ?1", table),
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        None => Ok(None),
        Some(s) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(other) => Err(StoreError::Corrupt {
                table,
                detail: format!("expected JSON object, found {}", json_kind(&other)),
            }),
            Err(e) => Err(StoreError::Corrupt {
                table,
                detail: e.to_string(),
            }),
        },
    }
}

/// Write a user's JSON document, stamping `updated_at`.
pub(crate) fn store_document(
    conn: &Connection,
    table: &'static str,
    user_id: i64,
    doc: &Map<String, Value>,
) -> StoreResult<()> {
    let data = Value::Object(doc.clone()).to_string();
    let now = Utc::now().to_rfc3339();
    conn.execute(
        &format!(
            "INSERT INTO {} (user_id, data, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            table
        ),
        params![user_id, data, now],
    )?;
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
