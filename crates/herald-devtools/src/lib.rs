//! Herald DevTools
//!
//! Diagnostics for the push setup of a page:
//! - Read-only inspection (registrations, permission, environment)
//! - Repairs (unregister workers, clear provider storage, resubscribe)
//! - Test notifications

mod host;
mod storage;
mod toolkit;

pub use host::{BrowserSubscription, PageHost, PlatformFeatures};
pub use storage::{StorageArea, WebStorage};
pub use toolkit::{Diagnostics, DiagnosticsReport, EnvironmentReport, RegistrationReport};

/// Diagnostics error
#[derive(Debug, thiserror::Error)]
pub enum DiagnosticsError {
    #[error("Notification permission denied")]
    PermissionDenied,

    #[error("Not supported by this browser: {0}")]
    Unsupported(&'static str),

    #[error("Page error: {0}")]
    Host(String),

    #[error(transparent)]
    Vapid(#[from] herald_vapid::VapidError),
}
