//! Worker events and their outcomes

use herald_common::NotificationPayload;
use herald_net::{Request, Response};

use crate::WorkerReply;

/// Push event
#[derive(Debug, Clone, Default)]
pub struct PushEvent {
    /// Raw message data, if the push carried any
    pub data: Option<Vec<u8>>,
}

impl PushEvent {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: Some(data.into()) }
    }

    pub fn empty() -> Self {
        Self { data: None }
    }
}

/// A notification currently on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedNotification {
    pub tag: String,
    pub payload: NotificationPayload,
}

/// Notification click event
#[derive(Debug, Clone, Default)]
pub struct NotificationClickEvent {
    pub notification: Option<DisplayedNotification>,
}

/// Message event from a page
#[derive(Debug, Clone, Default)]
pub struct MessageEvent {
    /// Client that posted the message
    pub source: Option<String>,
    pub data: Vec<u8>,
}

/// Events dispatched to the worker
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
    Push(PushEvent),
    NotificationClick(NotificationClickEvent),
    Message(MessageEvent),
}

impl WorkerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Fetch(_) => "fetch",
            Self::Push(_) => "push",
            Self::NotificationClick(_) => "notificationclick",
            Self::Message(_) => "message",
        }
    }
}

/// Where a fetch response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    /// Synthetic placeholder served when both cache and network failed
    Offline,
}

/// Result of a fetch event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted
    Passthrough,
    Respond { response: Response, source: ResponseSource },
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Passthrough => None,
            Self::Respond { response, .. } => Some(response),
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            Self::Passthrough => None,
            Self::Respond { source, .. } => Some(*source),
        }
    }
}

/// What handling an event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Installed { cache: String, cached: usize },
    Activated { deleted: Vec<String>, claimed: usize },
    Fetch(FetchOutcome),
    NotificationShown(NotificationPayload),
    NotificationOpened { url: String, focused: bool },
    Message(Option<WorkerReply>),
    /// Nothing to do
    Ignored,
}
