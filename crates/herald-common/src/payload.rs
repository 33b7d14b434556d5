//! Notification payload
//!
//! The JSON document relayed to the push service and parsed again by the
//! service worker when the push event fires.

use serde::{Deserialize, Serialize};

/// Longest title a payload may carry, in characters
pub const MAX_TITLE_CHARS: usize = 100;
/// Longest body a payload may carry, in characters
pub const MAX_BODY_CHARS: usize = 300;

/// Data attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    /// Page opened when the notification is clicked
    pub url: String,
}

impl Default for NotificationData {
    fn default() -> Self {
        Self { url: "/".to_string() }
    }
}

/// Notification payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default)]
    pub data: NotificationData,
}

impl NotificationPayload {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            icon: None,
            badge: None,
            data: NotificationData::default(),
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.data.url = url.to_string();
        self
    }

    /// Whether title and body are within the payload limits
    pub fn within_limits(&self) -> bool {
        self.title.chars().count() <= MAX_TITLE_CHARS && self.body.chars().count() <= MAX_BODY_CHARS
    }

    /// Truncate title and body to the payload limits
    pub fn clamped(mut self) -> Self {
        self.title = clamp_chars(&self.title, MAX_TITLE_CHARS);
        self.body = clamp_chars(&self.body, MAX_BODY_CHARS);
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Keep at most `max` characters of `s`
pub fn clamp_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
