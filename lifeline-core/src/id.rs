//! Prefixed random id generation.
//!
//! Ids look like `usr_4rfJ9wXzQm2k8vPa` (a short type prefix followed by
//! URL-safe base64 over at least 96 bits of entropy), so a bare id in a log
//! line or API payload is self-describing.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};

/// Generate a `{prefix}_{random}` id with 96 bits of entropy.
pub fn generate_prefixed_id(prefix: &str) -> String {
    let mut bytes = [0u8; 12];
    OsRng.try_fill_bytes(&mut bytes).unwrap();

    let encoded = BASE64_URL_SAFE_NO_PAD.encode(bytes);

    format!("{prefix}_{encoded}")
}

/// Check that `id` is `{expected_prefix}_` followed by valid base64 carrying
/// at least 96 bits.
pub fn validate_prefixed_id(id: &str, expected_prefix: &str) -> bool {
    let Some(random_part) = id.strip_prefix(&format!("{expected_prefix}_")) else {
        return false;
    };

    match BASE64_URL_SAFE_NO_PAD.decode(random_part) {
        Ok(decoded) => decoded.len() >= 12,
        Err(_) => false,
    }
}
