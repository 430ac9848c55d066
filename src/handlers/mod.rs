pub mod content;
pub mod usage;
pub mod users;

use axum::{Json, Router, routing::get, routing::post};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Liveness probe; no session required
pub async fn health() -> Json<Value> {
  Json(json!({ "status": "ok" }))
}

/// Assemble the full API router
pub fn app_router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/difficulties", get(content::list_difficulties))
    .route("/lessons/{difficulty_id}", get(content::list_lessons))
    .route("/lessons/{difficulty_id}/{lesson_id}", get(content::get_lesson))
    .route("/users/profile", get(users::get_profile).put(users::update_profile))
    .route("/users/progress", get(users::get_progress).put(users::update_progress))
    .route("/users/settings", get(users::get_settings).put(users::update_settings))
    .route("/users/usage", get(usage::get_usage).post(usage::record_usage))
    .route("/users/mark-not-new", post(users::mark_not_new))
    .route(
      "/users/mark-lesson-tour-completed",
      post(users::mark_lesson_tour_completed),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
