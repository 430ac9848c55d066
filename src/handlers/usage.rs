//! Usage-limit endpoints for metered features.
//!
//! GET is a pure read; POST is the atomic increment-and-read. A reader
//! racing a concurrent increment may see a transiently newer count -
//! acceptable for a limit display, and the counter itself never loses
//! an update.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::db::{self, UsageSummary, try_lock};
use crate::error::ApiError;
use crate::state::AppState;

/// Request type metered when the client does not name one
pub const DEFAULT_REQUEST_TYPE: &str = "chat";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUsageBody {
  #[serde(default)]
  pub request_type: Option<String>,
}

pub async fn get_usage(
  State(state): State<AppState>,
  auth: AuthContext,
) -> Result<Json<UsageSummary>, ApiError> {
  let conn = try_lock(&state.db)?;
  let summary = db::usage::check_usage(
    &conn,
    auth.user_id,
    &state.limits,
    DEFAULT_REQUEST_TYPE,
    Utc::now(),
  )?;
  Ok(Json(summary))
}

pub async fn record_usage(
  State(state): State<AppState>,
  auth: AuthContext,
  body: Option<Json<RecordUsageBody>>,
) -> Result<Json<UsageSummary>, ApiError> {
  let request_type = body
    .and_then(|Json(b)| b.request_type)
    .unwrap_or_else(|| DEFAULT_REQUEST_TYPE.to_string());

  let conn = try_lock(&state.db)?;
  let summary = db::usage::increment_usage(
    &conn,
    auth.user_id,
    &state.limits,
    &request_type,
    Utc::now(),
  )?;
  Ok(Json(summary))
}
