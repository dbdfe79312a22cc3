//! Confirmation codes for the signup flow.
//!
//! A code is six random decimal digits. Only a hash of it is persisted (see
//! `yamdb_api::auth::code`), together with an expiry. A code is consumed by
//! the first successful token exchange.

use chrono::Duration;
use rand::Rng;

use crate::types::Timestamp;

/// Number of digits in a confirmation code.
pub const CODE_LENGTH: usize = 6;

/// Default lifetime of an issued code, in minutes.
pub const DEFAULT_CODE_TTL_MINS: i64 = 15;

/// Generate a random numeric confirmation code, zero-padded to [`CODE_LENGTH`].
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Cheap shape check before spending an Argon2 verification on the input.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Expiry timestamp for a code issued at `issued_at`.
pub fn expires_at(issued_at: Timestamp, ttl_mins: i64) -> Timestamp {
    issued_at + Duration::minutes(ttl_mins)
}

/// A code with no expiry on record is treated as expired.
pub fn is_expired(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    match expires_at {
        Some(at) => at <= now,
        None => true,
    }
}
