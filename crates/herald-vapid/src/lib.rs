//! Herald VAPID
//!
//! Validation and decoding of VAPID application server keys, plus the
//! process-wide key pair used to sign push deliveries.

mod key;
mod keypair;

pub use key::{is_valid_public_key, key_to_binary, key_to_url_safe_base64, PUBLIC_KEY_LEN};
pub use keypair::{
    VapidKeyPair, DEFAULT_SUBJECT, ENV_BROWSER_PUBLIC_KEY, ENV_PRIVATE_KEY, ENV_PUBLIC_KEY,
    ENV_SUBJECT,
};

/// VAPID error
#[derive(Debug, thiserror::Error)]
pub enum VapidError {
    #[error("Malformed base64url key: {0}")]
    Decode(String),

    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid VAPID public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid VAPID private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Browser public key does not match server public key")]
    KeyMismatch,
}
