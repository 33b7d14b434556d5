//! Push subscription records and permission state

use serde::{Deserialize, Serialize};

/// Push subscription keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// P-256 Diffie-Hellman key
    pub p256dh: String,
    /// Authentication secret
    pub auth: String,
}

/// A stored browser push subscription.
///
/// Owned by the subscriber; the delivery pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscriptionRecord {
    #[serde(alias = "userId")]
    pub user_id: String,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

impl PushSubscriptionRecord {
    pub fn new(user_id: &str, endpoint: &str, p256dh: &str, auth: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            endpoint: endpoint.to_string(),
            keys: SubscriptionKeys {
                p256dh: p256dh.to_string(),
                auth: auth.to_string(),
            },
        }
    }
}

/// Notification permission state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    #[default]
    Default,
    Granted,
    Denied,
}

impl NotificationPermission {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}
