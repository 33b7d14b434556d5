//! Public key shape checks and base64url conversion

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, Engine};

use crate::VapidError;

/// Length of an uncompressed P-256 public key encoded as unpadded base64url
pub const PUBLIC_KEY_LEN: usize = 88;

/// Standard alphabet that, like `atob`, ignores non-zero trailing bits
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Check the shape of a VAPID public key.
///
/// Only the encoding is checked. Whether the browser and the signing side
/// agree on the same key is a separate concern, see
/// [`VapidKeyPair::ensure_matches`](crate::VapidKeyPair::ensure_matches).
pub fn is_valid_public_key(key: &str) -> bool {
    key.len() == PUBLIC_KEY_LEN
        && key.starts_with('B')
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Decode a base64url key into raw bytes for subscription calls
pub fn key_to_binary(key: &str) -> Result<Vec<u8>, VapidError> {
    let padding = (4 - key.len() % 4) % 4;
    let mut standard = String::with_capacity(key.len() + padding);
    for c in key.chars() {
        standard.push(match c {
            '-' => '+',
            '_' => '/',
            other => other,
        });
    }
    standard.extend(std::iter::repeat_n('=', padding));

    LENIENT
        .decode(standard.as_bytes())
        .map_err(|e| VapidError::Decode(e.to_string()))
}

/// Encode raw key bytes as unpadded base64url
pub fn key_to_url_safe_base64(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}
