//! Identity-scoped record types and partial-update merge semantics.
//!
//! Profile, progress, and settings records are JSON objects. Updates are
//! shallow key overlays: fields present in the partial replace the stored
//! ones, all other fields are preserved. The merge is an explicit function
//! here so the contract is testable independent of the store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Overlay `partial` onto `base`, key by key. Shallow: a key present in
/// `partial` replaces the stored value wholesale, nested objects included.
pub fn merge_fields(base: &mut Map<String, Value>, partial: &Map<String, Value>) {
    for (key, value) in partial {
        base.insert(key.clone(), value.clone());
    }
}

/// User profile record.
///
/// `is_new_user` and `lesson_tour_completed` drive client onboarding;
/// any other fields the client stores ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub is_new_user: bool,
    pub lesson_tour_completed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            is_new_user: true,
            lesson_tour_completed: false,
            extra: Map::new(),
        }
    }
}

impl UserProfile {
    /// The profile as a JSON object, the form merges operate on.
    pub fn to_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // Serializing a struct of bools and a map cannot produce
            // anything but an object
            _ => Map::new(),
        }
    }
}

/// Per-lesson/per-topic completion state, shaped by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearningProgress(pub Map<String, Value>);

/// User preference bag (notifications, locale, playback speed, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserSettings(pub Map<String, Value>);
