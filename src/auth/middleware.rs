//! Authentication extractor for identity-scoped routes.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use super::db as auth_db;
use crate::config;
use crate::db::{self, LogOnError, try_lock};
use crate::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "hantalk_session";

/// Authenticated request context.
/// Add this as a handler parameter to require a valid session.
/// Rejects with 401 if the cookie is missing, unknown, or expired.
///
/// Handlers pass `user_id` explicitly into every data-access call; no
/// identity is ever read from ambient state below this point.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub subject: String,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Extract cookies
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthorized.into_response())?;

        // Get session cookie
        let session_id = jar
            .get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .ok_or_else(|| ApiError::Unauthorized.into_response())?;

        let conn = try_lock(&state.db).map_err(|_| ApiError::Internal.into_response())?;

        // Purge expired sessions and closed usage windows occasionally
        // (~10% of validations)
        if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
            auth_db::cleanup_expired_sessions(&conn).log_warn("Session cleanup failed");
            db::usage::prune_closed_windows(&conn, chrono::Utc::now())
                .log_warn("Usage window pruning failed");
        }

        // Validate session
        let (user_id, subject) = auth_db::get_session_user(&conn, &session_id)
            .map_err(|e| {
                tracing::error!("Session lookup failed: {}", e);
                ApiError::Internal.into_response()
            })?
            .ok_or_else(|| ApiError::Unauthorized.into_response())?;

        Ok(AuthContext { user_id, subject })
    }
}
