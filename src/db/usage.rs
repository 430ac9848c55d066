//! Windowed usage counters for rate-limited features.
//!
//! Counters accumulate per (user, request type) over a fixed UTC calendar
//! day and implicitly reset when the day rolls over - old windows are
//! simply never read again. The increment is a single SQL upsert, so
//! concurrent requests for the same identity cannot lose an update. A
//! missing counter row reads as zero usage, never an error.

use chrono::{DateTime, NaiveTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use super::StoreResult;
use crate::config::UsageLimits;

/// Usage standing for one request type within the current window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub used: i64,
    pub limit: i64,
    pub remaining: i64,
    pub window_resets_at: DateTime<Utc>,
}

impl UsageSummary {
    fn new(used: i64, limit: i64, window_resets_at: DateTime<Utc>) -> Self {
        Self {
            used,
            limit,
            remaining: (limit - used).max(0),
            window_resets_at,
        }
    }
}

/// Key of the window containing `now` (UTC date, e.g. "2026-08-07")
fn window_start(now: DateTime<Utc>) -> String {
    now.date_naive().to_string()
}

/// First instant after the window containing `now` (next UTC midnight)
fn window_resets_at(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let next = today.succ_opt().unwrap_or(today);
    next.and_time(NaiveTime::MIN).and_utc()
}

/// Read-only usage check. Does not mutate the counter.
pub fn check_usage(
    conn: &Connection,
    user_id: i64,
    limits: &UsageLimits,
    request_type: &str,
    now: DateTime<Utc>,
) -> StoreResult<UsageSummary> {
    let used: i64 = conn
        .query_row(
            "SELECT count FROM usage_counters
             WHERE user_id = ?1 AND request_type = ?2 AND window_start = ?3",
            params![user_id, request_type, window_start(now)],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);

    Ok(UsageSummary::new(
        used,
        limits.limit_for(request_type),
        window_resets_at(now),
    ))
}

/// Atomically bump the counter for `request_type` in the current window,
/// creating the window row if absent, and return the post-increment
/// summary.
pub fn increment_usage(
    conn: &Connection,
    user_id: i64,
    limits: &UsageLimits,
    request_type: &str,
    now: DateTime<Utc>,
) -> StoreResult<UsageSummary> {
    conn.execute(
        "INSERT INTO usage_counters (user_id, request_type, window_start, count)
         VALUES (?1, ?2, ?3, 1)
         ON CONFLICT(user_id, request_type, window_start) DO UPDATE SET count = count + 1",
        params![user_id, request_type, window_start(now)],
    )?;

    check_usage(conn, user_id, limits, request_type, now)
}

/// Delete counter rows from windows that ended before `now`.
/// Correctness never depends on this; it only keeps the table small.
pub fn prune_closed_windows(conn: &Connection, now: DateTime<Utc>) -> StoreResult<usize> {
    let count = conn.execute(
        "DELETE FROM usage_counters WHERE window_start < ?1",
        params![window_start(now)],
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn limits() -> UsageLimits {
        UsageLimits::new(HashMap::from([("chat".to_string(), 5)]), 10)
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_no_usage_record_reads_as_zero() {
        let env = TestEnv::new().unwrap();
        let (user_id, _) = env.fabricate_identity("alice").unwrap();

        let summary = check_usage(&env.conn, user_id, &limits(), "chat", at(2026, 3, 1, 9)).unwrap();
        assert_eq!(summary.used, 0);
        assert_eq!(summary.limit, 5);
        assert_eq!(summary.remaining, 5);
    }

    #[test]
    fn test_increment_creates_and_counts() {
        let env = TestEnv::new().unwrap();
        let (user_id, _) = env.fabricate_identity("alice").unwrap();
        let now = at(2026, 3, 1, 9);

        let first = increment_usage(&env.conn, user_id, &limits(), "chat", now).unwrap();
        assert_eq!(first.used, 1);
        assert_eq!(first.remaining, 4);

        let second = increment_usage(&env.conn, user_id, &limits(), "chat", now).unwrap();
        assert_eq!(second.used, 2);
        assert_eq!(second.remaining, 3);
    }

    #[test]
    fn test_remaining_never_goes_negative() {
        let env = TestEnv::new().unwrap();
        let (user_id, _) = env.fabricate_identity("alice").unwrap();
        let now = at(2026, 3, 1, 9);

        for _ in 0..7 {
            increment_usage(&env.conn, user_id, &limits(), "chat", now).unwrap();
        }

        let summary = check_usage(&env.conn, user_id, &limits(), "chat", now).unwrap();
        assert_eq!(summary.used, 7);
        assert_eq!(summary.remaining, 0);
    }

    #[test]
    fn test_check_does_not_mutate() {
        let env = TestEnv::new().unwrap();
        let (user_id, _) = env.fabricate_identity("alice").unwrap();
        let now = at(2026, 3, 1, 9);

        increment_usage(&env.conn, user_id, &limits(), "chat", now).unwrap();
        check_usage(&env.conn, user_id, &limits(), "chat", now).unwrap();
        let summary = check_usage(&env.conn, user_id, &limits(), "chat", now).unwrap();
        assert_eq!(summary.used, 1);
    }

    #[test]
    fn test_window_rollover_resets_count() {
        let env = TestEnv::new().unwrap();
        let (user_id, _) = env.fabricate_identity("alice").unwrap();

        increment_usage(&env.conn, user_id, &limits(), "chat", at(2026, 3, 1, 23)).unwrap();
        increment_usage(&env.conn, user_id, &limits(), "chat", at(2026, 3, 1, 23)).unwrap();

        // Next UTC day: fresh window
        let summary = check_usage(&env.conn, user_id, &limits(), "chat", at(2026, 3, 2, 0)).unwrap();
        assert_eq!(summary.used, 0);
        assert_eq!(summary.remaining, 5);
    }

    #[test]
    fn test_window_resets_at_next_utc_midnight() {
        let env = TestEnv::new().unwrap();
        let (user_id, _) = env.fabricate_identity("alice").unwrap();

        let summary =
            check_usage(&env.conn, user_id, &limits(), "chat", at(2026, 3, 1, 15)).unwrap();
        assert_eq!(summary.window_resets_at, at(2026, 3, 2, 0));
    }

    #[test]
    fn test_request_types_are_counted_separately() {
        let env = TestEnv::new().unwrap();
        let (user_id, _) = env.fabricate_identity("alice").unwrap();
        let now = at(2026, 3, 1, 9);

        increment_usage(&env.conn, user_id, &limits(), "chat", now).unwrap();
        let pron = increment_usage(&env.conn, user_id, &limits(), "pronunciation", now).unwrap();

        assert_eq!(pron.used, 1);
        assert_eq!(pron.limit, 10);

        let chat = check_usage(&env.conn, user_id, &limits(), "chat", now).unwrap();
        assert_eq!(chat.used, 1);
    }

    #[test]
    fn test_identities_are_counted_separately() {
        let env = TestEnv::new().unwrap();
        let (alice, _) = env.fabricate_identity("alice").unwrap();
        let (bob, _) = env.fabricate_identity("bob").unwrap();
        let now = at(2026, 3, 1, 9);

        increment_usage(&env.conn, alice, &limits(), "chat", now).unwrap();
        increment_usage(&env.conn, alice, &limits(), "chat", now).unwrap();

        let summary = check_usage(&env.conn, bob, &limits(), "chat", now).unwrap();
        assert_eq!(summary.used, 0);
    }

    #[test]
    fn test_concurrent_increments_lose_nothing() {
        let env = TestEnv::new().unwrap();
        let (user_id, _) = env.fabricate_identity("alice").unwrap();
        let now = at(2026, 3, 1, 9);

        let TestEnv { temp: _temp, conn } = env;
        let pool = Arc::new(Mutex::new(conn));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        let conn = pool.lock().unwrap();
                        increment_usage(&conn, user_id, &limits(), "chat", now).unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let conn = pool.lock().unwrap();
        let summary = check_usage(&conn, user_id, &limits(), "chat", now).unwrap();
        assert_eq!(summary.used, 40);
    }

    #[test]
    fn test_prune_closed_windows() {
        let env = TestEnv::new().unwrap();
        let (user_id, _) = env.fabricate_identity("alice").unwrap();

        increment_usage(&env.conn, user_id, &limits(), "chat", at(2026, 3, 1, 9)).unwrap();
        increment_usage(&env.conn, user_id, &limits(), "chat", at(2026, 3, 2, 9)).unwrap();

        let pruned = prune_closed_windows(&env.conn, at(2026, 3, 2, 10)).unwrap();
        assert_eq!(pruned, 1);

        // Current window untouched
        let summary = check_usage(&env.conn, user_id, &limits(), "chat", at(2026, 3, 2, 11)).unwrap();
        assert_eq!(summary.used, 1);
    }
}
