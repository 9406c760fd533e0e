//! Share-token policy: generation, validity window, and the demo allowlist.
//!
//! A share token is a bearer capability. Whoever holds the string can read
//! the owning patient's record until it expires or is superseded, so the
//! token itself must be unguessable and must never be logged in full.

use chrono::Duration;
use rand::RngCore;

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of random bytes in a freshly issued token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Default validity window for an issued token, in days.
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

/// Upper bound on the length of a presented token. Anything longer cannot
/// be a token we issued and is rejected before touching the store.
pub const MAX_PRESENTED_TOKEN_LEN: usize = 256;

/// Number of leading characters safe to put in logs.
pub const LOG_PREFIX_LEN: usize = 8;

/// User id of the seeded demo patient that the demo tokens map to.
pub const DEMO_PATIENT_ID: DbId = 1;

/// Username of the seeded demo patient. The demo fallback only serves an
/// account that still carries it.
pub const DEMO_PATIENT_USERNAME: &str = "patient";

/// Fixed strings accepted as demo tokens when the fallback is enabled.
const DEMO_TOKENS: &[&str] = &["patient-qr-code", "patient-qr-code-1"];

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a new random share token.
///
/// Draws [`TOKEN_BYTES`] from the thread-local CSPRNG (seeded from the OS)
/// and hex-encodes them, giving a 64-character URL-safe string.
pub fn generate_share_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Compute the expiry timestamp for a token issued at `now`.
pub fn expiry_from(now: Timestamp, ttl_days: i64) -> Timestamp {
    now + Duration::days(ttl_days)
}

// ---------------------------------------------------------------------------
// Validity
// ---------------------------------------------------------------------------

/// Whether a token with the given expiry is dead at `now`.
///
/// A token without an expiry never expires. A token is still valid at the
/// exact instant of its expiry and dead strictly after it.
pub fn is_expired(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    matches!(expires_at, Some(at) if now > at)
}

/// Normalize a presented token string.
///
/// Returns `None` for input that cannot possibly match an issued token
/// (empty after trimming, or absurdly long).
pub fn normalize_presented(token: &str) -> Option<&str> {
    let trimmed = token.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_PRESENTED_TOKEN_LEN {
        return None;
    }
    Some(trimmed)
}

/// Loggable prefix of a token. Never log the full string.
pub fn log_prefix(token: &str) -> &str {
    token
        .char_indices()
        .nth(LOG_PREFIX_LEN)
        .map_or(token, |(idx, _)| &token[..idx])
}

// ---------------------------------------------------------------------------
// Demo fallback
// ---------------------------------------------------------------------------

/// Map a well-known demo token to the seeded demo patient.
///
/// This is an explicit allowlist. It is consulted only after a real store
/// lookup has missed, and only when the deployment enables demo tokens.
pub fn is_demo_token(token: &str) -> Option<DbId> {
    DEMO_TOKENS.contains(&token).then_some(DEMO_PATIENT_ID)
}

// ---------------------------------------------------------------------------
// hex encoding helper (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn generated_token_is_64_hex_chars() {
        let token = generate_share_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_tokens_differ() {
        let a = generate_share_token();
        let b = generate_share_token();
        assert_ne!(a, b, "two generated tokens must not collide");
    }

    #[test]
    fn expiry_is_ttl_days_ahead() {
        let now = Utc::now();
        let expires = expiry_from(now, DEFAULT_TOKEN_TTL_DAYS);
        assert_eq!(expires - now, Duration::days(30));
    }

    #[test]
    fn expiry_boundaries() {
        let now = Utc::now();
        assert!(!is_expired(None, now), "no expiry means never expired");
        assert!(!is_expired(Some(now), now), "valid at the exact instant");
        assert!(is_expired(Some(now - Duration::seconds(1)), now));
        assert!(!is_expired(Some(now + Duration::seconds(1)), now));
    }

    #[test]
    fn normalize_rejects_empty_and_oversized() {
        assert_eq!(normalize_presented("  abc \n"), Some("abc"));
        assert_eq!(normalize_presented("   "), None);
        assert_eq!(normalize_presented(""), None);
        let long = "a".repeat(MAX_PRESENTED_TOKEN_LEN + 1);
        assert_eq!(normalize_presented(&long), None);
    }

    #[test]
    fn log_prefix_truncates() {
        assert_eq!(log_prefix("0123456789abcdef"), "01234567");
        assert_eq!(log_prefix("abc"), "abc");
    }

    #[test]
    fn demo_allowlist_is_narrow() {
        assert_eq!(is_demo_token("patient-qr-code"), Some(DEMO_PATIENT_ID));
        assert_eq!(is_demo_token("patient-qr-code-1"), Some(DEMO_PATIENT_ID));
        assert_eq!(is_demo_token("patient-qr-code-2"), None);
        assert_eq!(is_demo_token("patient-qr-code-"), None);
        assert_eq!(is_demo_token("PATIENT-QR-CODE"), None);
        assert_eq!(is_demo_token(&generate_share_token()), None);
    }
}
