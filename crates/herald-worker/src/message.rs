//! Page ↔ worker messages
//!
//! Pages post `{"type": "..."}` objects to the worker. The set of kinds is
//! closed; anything else, including malformed data, is `Unknown`.

use serde::Serialize;
use serde_json::Value;

/// Message posted to the worker by a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerMessage {
    /// Activate a waiting worker immediately
    SkipWaiting,
    /// Ask for the deployed cache version
    GetVersion,
    /// Drop every cache generation
    ClearCache,
    /// Unrecognised `type`, or no `type` at all
    Unknown(Option<String>),
}

impl WorkerMessage {
    pub fn parse(data: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(data) {
            Ok(value) => value,
            Err(_) => return Self::Unknown(None),
        };

        match value.get("type").and_then(Value::as_str) {
            Some("SKIP_WAITING") => Self::SkipWaiting,
            Some("GET_VERSION") => Self::GetVersion,
            Some("CLEAR_CACHE") => Self::ClearCache,
            Some(other) => Self::Unknown(Some(other.to_string())),
            None => Self::Unknown(None),
        }
    }
}

/// Reply posted back to the page that sent a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerReply {
    Version { version: String, cache: String },
    CacheCleared { deleted: Vec<String> },
}
