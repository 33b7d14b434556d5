//! Push message parsing
//!
//! Structured payloads are JSON; anything that is not a JSON object is
//! shown as plain text rather than dropped.

use herald_common::{NotificationData, NotificationPayload};
use serde::Deserialize;
use serde_json::Value;

use crate::NotificationDefaults;

#[derive(Debug, Default, Deserialize)]
struct PushData {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PushMessage {
    title: Option<String>,
    #[serde(alias = "message")]
    body: Option<String>,
    icon: Option<String>,
    badge: Option<String>,
    url: Option<String>,
    data: Option<PushData>,
}

impl PushMessage {
    fn parse(data: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(data) {
            Ok(value @ Value::Object(_)) => match serde_json::from_value(value) {
                Ok(message) => message,
                Err(err) => {
                    tracing::warn!(error = %err, "Push payload has unexpected fields, using as text");
                    Self::text(String::from_utf8_lossy(data).into_owned())
                }
            },
            Ok(Value::String(text)) => Self::text(text),
            _ => Self::text(String::from_utf8_lossy(data).into_owned()),
        }
    }

    fn text(body: String) -> Self {
        Self {
            body: Some(body),
            ..Default::default()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Build the notification to display for raw push data
pub fn notification_from_push(data: Option<&[u8]>, defaults: &NotificationDefaults) -> NotificationPayload {
    let message = data.map(PushMessage::parse).unwrap_or_default();

    let url = message
        .data
        .and_then(|d| non_empty(d.url))
        .or_else(|| non_empty(message.url))
        .unwrap_or_else(|| defaults.url.clone());

    NotificationPayload {
        title: non_empty(message.title).unwrap_or_else(|| defaults.title.clone()),
        body: message.body.unwrap_or_else(|| defaults.body.clone()),
        icon: non_empty(message.icon).or_else(|| defaults.icon.clone()),
        badge: non_empty(message.badge).or_else(|| defaults.badge.clone()),
        data: NotificationData { url },
    }
    .clamped()
}
