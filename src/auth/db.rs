//! Identity database operations (users and sessions tables).

use chrono::{Duration, Utc};
use rusqlite::{Connection, Result, params};

/// Upsert a user row for an identity-provider subject, returning its id.
pub fn ensure_user(conn: &Connection, subject: &str) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR IGNORE INTO users (external_subject, created_at) VALUES (?1, ?2)",
        params![subject, now],
    )?;
    conn.query_row(
        "SELECT id FROM users WHERE external_subject = ?1",
        params![subject],
        |row| row.get(0),
    )
}

pub fn create_session(
    conn: &Connection,
    user_id: i64,
    session_id: &str,
    duration_hours: i64,
) -> Result<()> {
    let now = Utc::now();
    let expires = now + Duration::hours(duration_hours);
    conn.execute(
        "INSERT INTO sessions (id, user_id, created_at, expires_at, last_access_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            session_id,
            user_id,
            now.to_rfc3339(),
            expires.to_rfc3339(),
            now.to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Provision a user and a live session in one step.
///
/// This is the integration point the identity-provider callback calls
/// after authenticating a browser, and what tests use to fabricate
/// identities. Returns (user_id, session_id).
pub fn provision_session(
    conn: &Connection,
    subject: &str,
    duration_hours: i64,
) -> Result<(i64, String)> {
    let user_id = ensure_user(conn, subject)?;
    let session_id = super::generate_session_id();
    create_session(conn, user_id, &session_id, duration_hours)?;
    Ok((user_id, session_id))
}

/// Validate a session and get its identity, returns (user_id, subject)
pub fn get_session_user(conn: &Connection, session_id: &str) -> Result<Option<(i64, String)>> {
    let now = Utc::now().to_rfc3339();
    let mut stmt = conn.prepare(
        r#"
        SELECT u.id, u.external_subject
        FROM sessions s
        JOIN users u ON s.user_id = u.id
        WHERE s.id = ?1 AND s.expires_at > ?2
    "#,
    )?;
    let result = stmt.query_row(params![session_id, now], |row| Ok((row.get(0)?, row.get(1)?)));
    match result {
        Ok((user_id, subject)) => {
            // Update last access time
            let _ = conn.execute(
                "UPDATE sessions SET last_access_at = ?1 WHERE id = ?2",
                params![now, session_id],
            );
            Ok(Some((user_id, subject)))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Delete a session (logout)
pub fn delete_session(conn: &Connection, session_id: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
    Ok(())
}

/// Cleanup expired sessions, returns count of deleted sessions
pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    let count = conn.execute("DELETE FROM sessions WHERE expires_at < ?1", params![now])?;
    Ok(count)
}
