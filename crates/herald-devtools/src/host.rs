//! Page-side platform surface

use herald_common::{NotificationPayload, NotificationPermission, SubscriptionKeys};
use serde::Serialize;

use crate::DiagnosticsError;

/// Browser APIs available to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlatformFeatures {
    pub service_worker: bool,
    pub push_manager: bool,
    pub notifications: bool,
}

impl PlatformFeatures {
    pub fn all() -> Self {
        Self {
            service_worker: true,
            push_manager: true,
            notifications: true,
        }
    }
}

/// Subscription returned by `PushManager.subscribe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowserSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// The page the toolkit is attached to
#[allow(async_fn_in_trait)]
pub trait PageHost {
    fn hostname(&self) -> String;

    fn features(&self) -> PlatformFeatures;

    fn permission(&self) -> NotificationPermission;

    /// Prompt the user; resolves to the decision
    async fn request_permission(&self) -> NotificationPermission;

    async fn show_notification(&self, payload: &NotificationPayload) -> Result<(), DiagnosticsError>;

    async fn subscribe(&self, application_server_key: &[u8]) -> Result<BrowserSubscription, DiagnosticsError>;
}
