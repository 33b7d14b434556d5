//! Herald Push
//!
//! Server-side delivery: validate a send request, find the user's stored
//! subscription, then encrypt and sign the payload with the process-wide
//! VAPID key pair and post it to the push service.

mod relay;
mod request;
mod sender;
mod store;

pub use relay::{PushRelay, WebPushRelay, DEFAULT_TTL};
pub use request::SendPushRequest;
pub use sender::{PushDelivery, PushSender, PushSenderConfig};
pub use store::{FileSubscriptionStore, HttpSubscriptionStore, MemorySubscriptionStore, SubscriptionStore};

/// Push delivery error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    #[error("Invalid push request: {0}")]
    InvalidRequest(String),

    #[error("No push subscription for user {0}")]
    SubscriptionNotFound(String),

    #[error("Push delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Subscription store error: {0}")]
    Store(String),
}
