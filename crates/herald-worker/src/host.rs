//! Platform surface the worker runs against

use herald_common::NotificationPayload;

use crate::{WorkerError, WorkerReply};

/// An open window controlled by this worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
}

/// Browser-provided operations available inside the worker scope
#[allow(async_fn_in_trait)]
pub trait WorkerHost {
    /// Activate without waiting for old clients to close
    async fn skip_waiting(&self) -> Result<(), WorkerError>;

    /// Take control of open pages; returns how many were claimed
    async fn claim_clients(&self) -> Result<usize, WorkerError>;

    async fn show_notification(&self, payload: &NotificationPayload) -> Result<(), WorkerError>;

    async fn close_notification(&self, tag: &str);

    async fn window_clients(&self) -> Vec<WindowClient>;

    async fn focus_client(&self, id: &str) -> Result<(), WorkerError>;

    async fn open_window(&self, url: &str) -> Result<(), WorkerError>;

    async fn post_message(&self, client_id: &str, reply: &WorkerReply) -> Result<(), WorkerError>;
}
