//! Read-only lesson content endpoints.

use axum::Json;
use axum::extract::{Path, State};

use crate::content::{Difficulty, Lesson};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_difficulties(State(state): State<AppState>) -> Json<Vec<Difficulty>> {
  Json(state.content.difficulties().to_vec())
}

/// Lessons for a difficulty, sorted by ascending lesson number.
/// An unknown difficulty yields an empty list.
pub async fn list_lessons(
  State(state): State<AppState>,
  Path(difficulty_id): Path<String>,
) -> Json<Vec<Lesson>> {
  let mut lessons = state
    .content
    .lessons(&difficulty_id)
    .map(|l| l.to_vec())
    .unwrap_or_default();
  lessons.sort_by_key(|l| l.number);
  Json(lessons)
}

pub async fn get_lesson(
  State(state): State<AppState>,
  Path((difficulty_id, lesson_id)): Path<(String, String)>,
) -> Result<Json<Lesson>, ApiError> {
  state
    .content
    .lesson(&difficulty_id, &lesson_id)
    .cloned()
    .map(Json)
    .ok_or(ApiError::NotFound)
}
