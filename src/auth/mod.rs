//! Session validation and identity derivation.
//!
//! Credential issuance lives with the external identity provider; this
//! module only resolves the ambient session cookie to a user id and
//! provisions the session rows that issuance writes.

pub mod db;
pub mod middleware;

pub use middleware::{AuthContext, SESSION_COOKIE_NAME};

/// Generate a new session ID
pub fn generate_session_id() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..32)
        .map(|_| {
            let idx = rng.random_range(0..36);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect()
}
