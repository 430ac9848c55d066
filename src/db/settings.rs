//! User settings storage.
//!
//! Same partial-update discipline as learning progress: a preference bag
//! the client shapes, merged key by key on write.

use rusqlite::Connection;
use serde_json::{Map, Value};

use super::{StoreResult, load_document, store_document};
use crate::domain::{UserSettings, merge_fields};

const TABLE: &str = "user_settings";

pub fn get_settings(conn: &Connection, user_id: i64) -> StoreResult<Option<UserSettings>> {
    Ok(load_document(conn, TABLE, user_id)?.map(UserSettings))
}

/// Merge `partial` into the stored settings and return the merged record.
pub fn update_settings(
    conn: &Connection,
    user_id: i64,
    partial: &Map<String, Value>,
) -> StoreResult<UserSettings> {
    let mut fields = load_document(conn, TABLE, user_id)?.unwrap_or_default();
    merge_fields(&mut fields, partial);
    store_document(conn, TABLE, user_id, &fields)?;
    Ok(UserSettings(fields))
}
