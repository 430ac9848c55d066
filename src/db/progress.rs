//! Learning progress storage.
//!
//! Progress is a client-shaped JSON document (per-lesson or per-topic
//! completion state). Updates overlay the supplied keys onto the stored
//! document; an absent document is created from the empty object.

use rusqlite::Connection;
use serde_json::{Map, Value};

use super::{StoreResult, load_document, store_document};
use crate::domain::{LearningProgress, merge_fields};

const TABLE: &str = "learning_progress";

pub fn get_progress(conn: &Connection, user_id: i64) -> StoreResult<Option<LearningProgress>> {
    Ok(load_document(conn, TABLE, user_id)?.map(LearningProgress))
}

/// Merge `partial` into the stored progress and return the merged record.
pub fn update_progress(
    conn: &Connection,
    user_id: i64,
    partial: &Map<String, Value>,
) -> StoreResult<LearningProgress> {
    let mut fields = load_document(conn, TABLE, user_id)?.unwrap_or_default();
    merge_fields(&mut fields, partial);
    store_document(conn, TABLE, user_id, &fields)?;
    Ok(LearningProgress(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_get_absent_progress_is_none() {
        let env = TestEnv::new().unwrap();
        let (user_id, _) = env.fabricate_identity("alice").unwrap();
        assert!(get_progress(&env.conn, user_id).unwrap().is_none());
    }

    #[test]
    fn test_update_then_read_back_preserves_unmentioned_fields() {
        let env = TestEnv::new().unwrap();
        let (user_id, _) = env.fabricate_identity("alice").unwrap();

        update_progress(
            &env.conn,
            user_id,
            &obj(json!({"beginner/hangul": {"completed": true}})),
        )
        .unwrap();
        update_progress(
            &env.conn,
            user_id,
            &obj(json!({"beginner/greetings": {"completed": false, "score": 40}})),
        )
        .unwrap();

        let progress = get_progress(&env.conn, user_id).unwrap().unwrap();
        assert_eq!(progress.0["beginner/hangul"], json!({"completed": true}));
        assert_eq!(
            progress.0["beginner/greetings"],
            json!({"completed": false, "score": 40})
        );
    }

    #[test]
    fn test_update_overwrites_supplied_keys() {
        let env = TestEnv::new().unwrap();
        let (user_id, _) = env.fabricate_identity("alice").unwrap();

        update_progress(&env.conn, user_id, &obj(json!({"streak": 3}))).unwrap();
        let progress = update_progress(&env.conn, user_id, &obj(json!({"streak": 4}))).unwrap();

        assert_eq!(progress.0["streak"], json!(4));
    }
}
