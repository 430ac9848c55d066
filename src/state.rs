//! Application state passed to all handlers.

use std::sync::Arc;

use crate::config::UsageLimits;
use crate::content::ContentLibrary;
use crate::db::DbPool;

#[derive(Clone)]
pub struct AppState {
    /// Shared database (users, sessions, learning records, usage counters)
    pub db: DbPool,

    /// Immutable lesson content, loaded at startup
    pub content: Arc<ContentLibrary>,

    /// Per-request-type usage limits
    pub limits: UsageLimits,
}

impl AppState {
    pub fn new(db: DbPool, content: Arc<ContentLibrary>, limits: UsageLimits) -> Self {
        Self {
            db,
            content,
            limits,
        }
    }
}
