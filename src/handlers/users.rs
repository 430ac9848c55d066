//! Identity-scoped profile, progress, and settings endpoints.
//!
//! Each handler derives the caller from the validated session and passes
//! that identity explicitly into the data-access layer. No endpoint
//! accepts a foreign identity key in path or body.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::{Map, Value, json};

use crate::auth::AuthContext;
use crate::db::{self, try_lock};
use crate::domain::{LearningProgress, UserProfile, UserSettings};
use crate::error::ApiError;
use crate::state::AppState;

/// Unwrap a PUT body into the JSON object the merge operates on
fn partial_body(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
  let Json(value) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  match value {
    Value::Object(map) => Ok(map),
    _ => Err(ApiError::BadRequest("expected a JSON object".to_string())),
  }
}

pub async fn get_profile(
  State(state): State<AppState>,
  auth: AuthContext,
) -> Result<Json<UserProfile>, ApiError> {
  let conn = try_lock(&state.db)?;
  let profile = db::profile::get_profile(&conn, auth.user_id)?.ok_or(ApiError::NotFound)?;
  Ok(Json(profile))
}

pub async fn update_profile(
  State(state): State<AppState>,
  auth: AuthContext,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UserProfile>, ApiError> {
  let partial = partial_body(body)?;
  let conn = try_lock(&state.db)?;
  let profile = db::profile::update_profile(&conn, auth.user_id, &partial)?;
  Ok(Json(profile))
}

pub async fn get_progress(
  State(state): State<AppState>,
  auth: AuthContext,
) -> Result<Json<LearningProgress>, ApiError> {
  let conn = try_lock(&state.db)?;
  let progress = db::progress::get_progress(&conn, auth.user_id)?.ok_or(ApiError::NotFound)?;
  Ok(Json(progress))
}

pub async fn update_progress(
  State(state): State<AppState>,
  auth: AuthContext,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LearningProgress>, ApiError> {
  let partial = partial_body(body)?;
  let conn = try_lock(&state.db)?;
  let progress = db::progress::update_progress(&conn, auth.user_id, &partial)?;
  Ok(Json(progress))
}

pub async fn get_settings(
  State(state): State<AppState>,
  auth: AuthContext,
) -> Result<Json<UserSettings>, ApiError> {
  let conn = try_lock(&state.db)?;
  let settings = db::settings::get_settings(&conn, auth.user_id)?.ok_or(ApiError::NotFound)?;
  Ok(Json(settings))
}

pub async fn update_settings(
  State(state): State<AppState>,
  auth: AuthContext,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UserSettings>, ApiError> {
  let partial = partial_body(body)?;
  let conn = try_lock(&state.db)?;
  let settings = db::settings::update_settings(&conn, auth.user_id, &partial)?;
  Ok(Json(settings))
}

pub async fn mark_not_new(
  State(state): State<AppState>,
  auth: AuthContext,
) -> Result<Json<Value>, ApiError> {
  let conn = try_lock(&state.db)?;
  db::profile::mark_not_new(&conn, auth.user_id)?;
  Ok(Json(json!({ "success": true })))
}

pub async fn mark_lesson_tour_completed(
  State(state): State<AppState>,
  auth: AuthContext,
) -> Result<Json<Value>, ApiError> {
  let conn = try_lock(&state.db)?;
  db::profile::mark_lesson_tour_completed(&conn, auth.user_id)?;
  Ok(Json(json!({ "success": true })))
}
