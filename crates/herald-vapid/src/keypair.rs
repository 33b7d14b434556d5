//! Process-wide VAPID key pair

use std::fmt;

use crate::key::{is_valid_public_key, key_to_binary};
use crate::VapidError;

/// Server public key
pub const ENV_PUBLIC_KEY: &str = "VAPID_PUBLIC_KEY";
/// Server private key
pub const ENV_PRIVATE_KEY: &str = "VAPID_PRIVATE_KEY";
/// Contact URI sent to the push service
pub const ENV_SUBJECT: &str = "VAPID_SUBJECT";
/// Public key baked into the browser bundle
pub const ENV_BROWSER_PUBLIC_KEY: &str = "PUBLIC_VAPID_KEY";

/// Subject used when `VAPID_SUBJECT` is unset
pub const DEFAULT_SUBJECT: &str = "mailto:admin@localhost";

const PRIVATE_KEY_BYTES: usize = 32;

/// VAPID credentials shared by every component that subscribes or signs.
///
/// Loaded once at startup and passed by reference; there is no global copy.
#[derive(Clone, PartialEq, Eq)]
pub struct VapidKeyPair {
    public_key: String,
    private_key: String,
    subject: String,
}

impl VapidKeyPair {
    /// Build a key pair, validating both keys
    pub fn new(public_key: &str, private_key: &str, subject: &str) -> Result<Self, VapidError> {
        if !is_valid_public_key(public_key) {
            return Err(VapidError::InvalidPublicKey(format!(
                "expected {} base64url characters starting with 'B'",
                crate::PUBLIC_KEY_LEN
            )));
        }

        let private = key_to_binary(private_key)
            .map_err(|e| VapidError::InvalidPrivateKey(e.to_string()))?;
        if private.len() != PRIVATE_KEY_BYTES {
            return Err(VapidError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES,
                private.len()
            )));
        }

        Ok(Self {
            public_key: public_key.to_string(),
            private_key: private_key.to_string(),
            subject: subject.to_string(),
        })
    }

    /// Load from process environment variables
    pub fn from_env() -> Result<Self, VapidError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    ///
    /// When the browser bundle key is present it must equal the server key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, VapidError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let public_key = read(ENV_PUBLIC_KEY).ok_or(VapidError::MissingVar(ENV_PUBLIC_KEY))?;
        let private_key = read(ENV_PRIVATE_KEY).ok_or(VapidError::MissingVar(ENV_PRIVATE_KEY))?;
        let subject = read(ENV_SUBJECT).unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

        let pair = Self::new(&public_key, &private_key, &subject)?;

        if let Some(browser_key) = read(ENV_BROWSER_PUBLIC_KEY) {
            pair.ensure_matches(&browser_key)?;
        }

        tracing::info!(subject = %pair.subject, "Loaded VAPID key pair");
        Ok(pair)
    }

    /// Fail unless `other` is the same public key this pair signs with
    pub fn ensure_matches(&self, other: &str) -> Result<(), VapidError> {
        if other == self.public_key {
            Ok(())
        } else {
            tracing::warn!("VAPID public key mismatch between browser bundle and server");
            Err(VapidError::KeyMismatch)
        }
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Binary public key for `PushManager.subscribe`
    pub fn application_server_key(&self) -> Result<Vec<u8>, VapidError> {
        key_to_binary(&self.public_key)
    }
}

impl fmt::Debug for VapidKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidKeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("subject", &self.subject)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_to_url_safe_base64;
    use std::collections::HashMap;

    fn public_key() -> String {
        let mut bytes = vec![0x04u8];
        bytes.extend(std::iter::repeat_n(7u8, 65));
        key_to_url_safe_base64(&bytes)
    }

    fn private_key() -> String {
        key_to_url_safe_base64(&[9u8; 32])
    }

    fn env(pairs: &[(&str, String)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_from_lookup() {
        let vars = env(&[(ENV_PUBLIC_KEY, public_key()), (ENV_PRIVATE_KEY, private_key())]);
        let pair = VapidKeyPair::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(pair.public_key(), public_key());
        assert_eq!(pair.subject(), DEFAULT_SUBJECT);
        assert_eq!(pair.application_server_key().unwrap().len(), 66);
    }

    #[test]
    fn test_missing_private_key() {
        let vars = env(&[(ENV_PUBLIC_KEY, public_key())]);
        let err = VapidKeyPair::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, VapidError::MissingVar(ENV_PRIVATE_KEY)));
    }

    #[test]
    fn test_browser_key_mismatch() {
        let other = public_key().replacen('H', "I", 1);
        let vars = env(&[
            (ENV_PUBLIC_KEY, public_key()),
            (ENV_PRIVATE_KEY, private_key()),
            (ENV_BROWSER_PUBLIC_KEY, other),
        ]);
        let err = VapidKeyPair::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, VapidError::KeyMismatch));
    }

    #[test]
    fn test_short_private_key() {
        let short = key_to_url_safe_base64(&[1u8; 16]);
        let err = VapidKeyPair::new(&public_key(), &short, DEFAULT_SUBJECT).unwrap_err();
        assert!(matches!(err, VapidError::InvalidPrivateKey(_)));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let pair = VapidKeyPair::new(&public_key(), &private_key(), "mailto:ops@example.com").unwrap();
        let debug = format!("{pair:?}");
        assert!(!debug.contains(&private_key()));
        assert!(debug.contains("redacted"));
    }
}
