//! Push sender

use herald_common::{NotificationData, NotificationPayload};
use herald_vapid::VapidKeyPair;
use serde::{Deserialize, Serialize};

use crate::{PushError, PushRelay, SendPushRequest, SubscriptionStore};

/// Delivery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushSenderConfig {
    /// Click target when the request carries no URL
    pub default_url: String,
    pub icon: Option<String>,
    pub badge: Option<String>,
}

impl Default for PushSenderConfig {
    fn default() -> Self {
        Self {
            default_url: NotificationData::default().url,
            icon: None,
            badge: None,
        }
    }
}

/// A payload accepted by the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushDelivery {
    pub user_id: String,
    pub endpoint: String,
    pub payload: NotificationPayload,
}

/// Sends notifications to stored subscriptions.
///
/// Each send is independent: no retries, and a subscription the push
/// service has expired is reported, not repaired.
pub struct PushSender<S, R> {
    config: PushSenderConfig,
    vapid: VapidKeyPair,
    store: S,
    relay: R,
}

impl<S: SubscriptionStore, R: PushRelay> PushSender<S, R> {
    pub fn new(vapid: VapidKeyPair, store: S, relay: R) -> Self {
        Self {
            config: PushSenderConfig::default(),
            vapid,
            store,
            relay,
        }
    }

    pub fn with_config(mut self, config: PushSenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PushSenderConfig {
        &self.config
    }

    pub fn vapid(&self) -> &VapidKeyPair {
        &self.vapid
    }

    /// Payload that would be sent for `request`
    pub fn payload_for(&self, request: &SendPushRequest) -> NotificationPayload {
        let url = request
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(self.config.default_url.as_str());

        NotificationPayload {
            title: request.title.clone(),
            body: request.body.clone(),
            icon: self.config.icon.clone(),
            badge: self.config.badge.clone(),
            data: NotificationData { url: url.to_string() },
        }
    }

    /// Validate, look up the subscription and relay the notification
    pub async fn send_push(&self, request: &SendPushRequest) -> Result<PushDelivery, PushError> {
        request.validate()?;

        // A store that cannot answer is treated like one with no record
        let found = match self.store.find(&request.user_id).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(user = %request.user_id, error = %err, "Subscription lookup failed");
                None
            }
        };
        let subscription = found.ok_or_else(|| PushError::SubscriptionNotFound(request.user_id.clone()))?;

        let payload = self.payload_for(request);
        let json = payload
            .to_json()
            .map_err(|e| PushError::DeliveryFailed(e.to_string()))?;

        if let Err(err) = self.relay.send(&subscription, &json, &self.vapid).await {
            tracing::warn!(user = %request.user_id, error = %err, "Push delivery failed");
            return Err(match err {
                PushError::DeliveryFailed(_) => err,
                other => PushError::DeliveryFailed(other.to_string()),
            });
        }

        tracing::info!(user = %request.user_id, endpoint = %subscription.endpoint, "Push accepted by push service");
        Ok(PushDelivery {
            user_id: request.user_id.clone(),
            endpoint: subscription.endpoint,
            payload,
        })
    }
}
