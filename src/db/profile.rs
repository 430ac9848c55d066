//! User profile storage.
//!
//! The profile is created implicitly on first write (merge onto the
//! default record), matching first-sign-in upsert semantics. Reads of an
//! absent profile return None, which the API surfaces as 404.

use rusqlite::Connection;
use serde_json::{Map, Value};

use super::{StoreError, StoreResult, load_document, store_document};
use crate::domain::{UserProfile, merge_fields};

const TABLE: &str = "user_profiles";

pub fn get_profile(conn: &Connection, user_id: i64) -> StoreResult<Option<UserProfile>> {
    match load_document(conn, TABLE, user_id)? {
        None => Ok(None),
        Some(fields) => serde_json::from_value(Value::Object(fields))
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                table: TABLE,
                detail: e.to_string(),
            }),
    }
}

/// Merge `partial` into the stored profile and return the merged record.
///
/// Fields absent from `partial` keep their stored values. The merged
/// result is validated before anything is written, so an update that
/// breaks the typed onboarding flags is rejected without side effects.
pub fn update_profile(
    conn: &Connection,
    user_id: i64,
    partial: &Map<String, Value>,
) -> StoreResult<UserProfile> {
    let mut fields = match load_document(conn, TABLE, user_id)? {
        Some(fields) => fields,
        None => UserProfile::default().to_fields(),
    };
    merge_fields(&mut fields, partial);

    let profile: UserProfile = serde_json::from_value(Value::Object(fields.clone()))
        .map_err(|e| StoreError::Rejected(format!("invalid profile update: {}", e)))?;

    store_document(conn, TABLE, user_id, &fields)?;
    Ok(profile)
}

/// Clear the new-user flag; idempotent.
pub fn mark_not_new(conn: &Connection, user_id: i64) -> StoreResult<UserProfile> {
    let mut partial = Map::new();
    partial.insert("is_new_user".to_string(), Value::Bool(false));
    update_profile(conn, user_id, &partial)
}

/// Record that the lesson tour has been completed; idempotent.
pub fn mark_lesson_tour_completed(conn: &Connection, user_id: i64) -> StoreResult<UserProfile> {
    let mut partial = Map::new();
    partial.insert("lesson_tour_completed".to_string(), Value::Bool(true));
    update_profile(conn, user_id, &partial)
}
