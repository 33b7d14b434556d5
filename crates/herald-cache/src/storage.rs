//! Cache Storage
//!
//! Named caches keyed by request URL. The storage is a cloneable handle;
//! concurrent writers are serialized by one mutex (last write wins).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use herald_net::Response;

use crate::CacheError;

/// A cached response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self::from(Response::new(status, body))
    }

    pub fn to_response(&self) -> Response {
        Response {
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }

    fn size(&self) -> usize {
        self.body.len()
    }
}

impl From<Response> for CachedResponse {
    fn from(resp: Response) -> Self {
        Self {
            status: resp.status,
            status_text: resp.status_text,
            headers: resp.headers,
            body: resp.body,
        }
    }
}

impl From<&Response> for CachedResponse {
    fn from(resp: &Response) -> Self {
        Self::from(resp.clone())
    }
}

#[derive(Debug, Default)]
struct Cache {
    entries: HashMap<String, CachedResponse>,
}

impl Cache {
    fn size(&self) -> usize {
        self.entries.values().map(CachedResponse::size).sum()
    }
}

#[derive(Debug, Default)]
struct StorageInner {
    caches: HashMap<String, Cache>,
    quota_bytes: Option<usize>,
    used_bytes: usize,
}

impl StorageInner {
    fn check_quota(&self, additional: usize, released: usize) -> Result<(), CacheError> {
        if let Some(quota) = self.quota_bytes {
            let after = self.used_bytes.saturating_sub(released) + additional;
            if after > quota {
                return Err(CacheError::Unavailable(format!(
                    "quota exceeded: {after} of {quota} bytes"
                )));
            }
        }
        Ok(())
    }
}

/// CacheStorage - container for named caches
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    inner: Arc<Mutex<StorageInner>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses writes beyond `bytes` of response bodies
    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::default();
        if let Ok(mut inner) = storage.inner.lock() {
            inner.quota_bytes = Some(bytes);
        }
        storage
    }

    fn lock(&self) -> Result<MutexGuard<'_, StorageInner>, CacheError> {
        self.inner
            .lock()
            .map_err(|_| CacheError::Unavailable("cache storage lock poisoned".into()))
    }

    /// Open or create a cache
    pub fn open(&self, name: &str) -> Result<CacheHandle, CacheError> {
        self.lock()?.caches.entry(name.to_string()).or_default();
        Ok(CacheHandle {
            storage: self.clone(),
            name: name.to_string(),
        })
    }

    /// Check if cache exists
    pub fn has(&self, name: &str) -> Result<bool, CacheError> {
        Ok(self.lock()?.caches.contains_key(name))
    }

    /// Delete a cache and everything in it
    pub fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let mut inner = self.lock()?;
        match inner.caches.remove(name) {
            Some(cache) => {
                inner.used_bytes = inner.used_bytes.saturating_sub(cache.size());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// List all cache names, sorted
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut names: Vec<String> = self.lock()?.caches.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Look up a URL in one named cache without creating it
    pub fn match_in(&self, name: &str, url: &str) -> Result<Option<CachedResponse>, CacheError> {
        Ok(self
            .lock()?
            .caches
            .get(name)
            .and_then(|c| c.entries.get(url))
            .cloned())
    }

    /// Bytes of response bodies currently stored
    pub fn usage(&self) -> Result<usize, CacheError> {
        Ok(self.lock()?.used_bytes)
    }
}

/// Handle to one named cache
#[derive(Debug, Clone)]
pub struct CacheHandle {
    storage: CacheStorage,
    name: String,
}

impl CacheHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a response, replacing any previous entry for the URL
    pub fn put(&self, url: &str, response: CachedResponse) -> Result<(), CacheError> {
        self.put_all(vec![(url.to_string(), response)])
    }

    /// Store several responses; either all are written or none.
    ///
    /// A URL listed more than once keeps its last response.
    pub fn put_all(&self, entries: Vec<(String, CachedResponse)>) -> Result<(), CacheError> {
        let entries: HashMap<String, CachedResponse> = entries.into_iter().collect();
        let mut inner = self.storage.lock()?;

        let cache = inner
            .caches
            .get(&self.name)
            .ok_or_else(|| CacheError::NoSuchCache(self.name.clone()))?;
        let additional: usize = entries.iter().map(|(_, r)| r.size()).sum();
        let released: usize = entries
            .iter()
            .filter_map(|(url, _)| cache.entries.get(url))
            .map(CachedResponse::size)
            .sum();
        inner.check_quota(additional, released)?;

        let mut delta_released = 0;
        if let Some(cache) = inner.caches.get_mut(&self.name) {
            for (url, response) in entries {
                if let Some(old) = cache.entries.insert(url, response) {
                    delta_released += old.size();
                }
            }
        }
        inner.used_bytes = inner.used_bytes.saturating_sub(delta_released) + additional;
        Ok(())
    }

    /// Find a cached response
    pub fn match_url(&self, url: &str) -> Result<Option<CachedResponse>, CacheError> {
        self.storage.match_in(&self.name, url)
    }

    /// Delete a cached response
    pub fn delete(&self, url: &str) -> Result<bool, CacheError> {
        let mut inner = self.storage.lock()?;
        let removed = inner
            .caches
            .get_mut(&self.name)
            .and_then(|c| c.entries.remove(url));
        match removed {
            Some(old) => {
                inner.used_bytes = inner.used_bytes.saturating_sub(old.size());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// List all cached URLs, sorted
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let inner = self.storage.lock()?;
        let mut urls: Vec<String> = inner
            .caches
            .get(&self.name)
            .map(|c| c.entries.keys().cloned().collect())
            .unwrap_or_default();
        urls.sort();
        Ok(urls)
    }
}
