//! Subscription storage
//!
//! Subscriptions are written by the page when the user opts in; delivery
//! only ever reads them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use herald_common::PushSubscriptionRecord;
use herald_net::{Fetcher, HttpFetcher, NetError, Request, Url};
use serde::Deserialize;

use crate::PushError;

/// Lookup of a user's push subscription
#[allow(async_fn_in_trait)]
pub trait SubscriptionStore {
    async fn find(&self, user_id: &str) -> Result<Option<PushSubscriptionRecord>, PushError>;
}

impl<S: SubscriptionStore> SubscriptionStore for &S {
    async fn find(&self, user_id: &str) -> Result<Option<PushSubscriptionRecord>, PushError> {
        (**self).find(user_id).await
    }
}

/// In-memory store, one subscription per user
#[derive(Debug, Clone, Default)]
pub struct MemorySubscriptionStore {
    records: HashMap<String, PushSubscriptionRecord>,
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record, replacing the user's previous one
    pub fn insert(&mut self, record: PushSubscriptionRecord) -> Option<PushSubscriptionRecord> {
        self.records.insert(record.user_id.clone(), record)
    }

    pub fn remove(&mut self, user_id: &str) -> Option<PushSubscriptionRecord> {
        self.records.remove(user_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<PushSubscriptionRecord> for MemorySubscriptionStore {
    fn from_iter<I: IntoIterator<Item = PushSubscriptionRecord>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

impl SubscriptionStore for MemorySubscriptionStore {
    async fn find(&self, user_id: &str) -> Result<Option<PushSubscriptionRecord>, PushError> {
        Ok(self.records.get(user_id).cloned())
    }
}

/// Subscriptions loaded from a JSON array on disk.
///
/// When a user appears more than once the last record wins.
#[derive(Debug, Clone)]
pub struct FileSubscriptionStore {
    path: PathBuf,
    records: MemorySubscriptionStore,
}

impl FileSubscriptionStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PushError> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path)
            .map_err(|e| PushError::Store(format!("{}: {}", path.display(), e)))?;
        let records = Self::parse(&text)
            .map_err(|e| PushError::Store(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), count = records.len(), "Loaded subscriptions");
        Ok(Self { path, records })
    }

    fn parse(text: &str) -> serde_json::Result<MemorySubscriptionStore> {
        let records: Vec<PushSubscriptionRecord> = serde_json::from_str(text)?;
        Ok(records.into_iter().collect())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SubscriptionStore for FileSubscriptionStore {
    async fn find(&self, user_id: &str) -> Result<Option<PushSubscriptionRecord>, PushError> {
        self.records.find(user_id).await
    }
}

#[derive(Deserialize)]
struct SubscriptionEnvelope {
    subscription: Option<PushSubscriptionRecord>,
}

/// Subscriptions served over HTTP at `{base}/{user_id}`
#[derive(Debug, Clone)]
pub struct HttpSubscriptionStore<F = HttpFetcher> {
    base: Url,
    fetcher: F,
}

impl<F: Fetcher> HttpSubscriptionStore<F> {
    pub fn new(base: &str, fetcher: F) -> Result<Self, PushError> {
        let base = Url::parse(base).map_err(|e| PushError::Store(format!("{base}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(PushError::Store(format!("{base}: not a base URL")));
        }
        Ok(Self { base, fetcher })
    }

    fn url_for(&self, user_id: &str) -> String {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(user_id);
        }
        url.into()
    }
}

impl<F: Fetcher> SubscriptionStore for HttpSubscriptionStore<F> {
    async fn find(&self, user_id: &str) -> Result<Option<PushSubscriptionRecord>, PushError> {
        let url = self.url_for(user_id);
        let response = self
            .fetcher
            .fetch(&Request::get(&url).with_header("Accept", "application/json"))
            .await
            .map_err(|e| PushError::Store(e.to_string()))?;

        if response.status == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            let err = NetError::HttpError { status: response.status };
            return Err(PushError::Store(format!("{url}: {err}")));
        }

        let envelope: SubscriptionEnvelope = response
            .json()
            .map_err(|e| PushError::Store(format!("{url}: {e}")))?;
        Ok(envelope.subscription)
    }
}
