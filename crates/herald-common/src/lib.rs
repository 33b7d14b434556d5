//! Herald Common
//!
//! Types shared by the service worker and the delivery pipeline.

mod payload;
mod subscription;

pub use payload::{clamp_chars, NotificationData, NotificationPayload, MAX_BODY_CHARS, MAX_TITLE_CHARS};
pub use subscription::{NotificationPermission, PushSubscriptionRecord, SubscriptionKeys};
