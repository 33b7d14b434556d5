//! Herald Service Worker
//!
//! Lifecycle controller for the front-end's service worker: install and
//! activate the versioned cache, answer fetches by strategy, display push
//! notifications and route notification clicks.
//!
//! Each event goes through [`ServiceWorker::dispatch`], whose future only
//! resolves once all of the handler's work is done.

mod config;
mod events;
mod host;
mod message;
mod push;
mod registration;
mod strategy;
mod worker;

use std::time::Duration;

pub use config::{NotificationDefaults, RuntimeRule, WorkerConfig};
pub use events::{
    DisplayedNotification, EventOutcome, FetchOutcome, MessageEvent, NotificationClickEvent,
    PushEvent, ResponseSource, WorkerEvent,
};
pub use host::{WindowClient, WorkerHost};
pub use message::{WorkerMessage, WorkerReply};
pub use push::notification_from_push;
pub use registration::{
    RegisteredWorker, RegistrationError, ServiceWorkerContainer, ServiceWorkerRegistration,
    ServiceWorkerState,
};
pub use strategy::{route, Route, Strategy};
pub use worker::ServiceWorker;

/// Worker error
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Cache(#[from] herald_cache::CacheError),

    #[error(transparent)]
    Network(#[from] herald_net::NetError),

    #[error("Handler exceeded its {0:?} budget")]
    Timeout(Duration),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Invalid worker config: {0}")]
    Config(String),
}
