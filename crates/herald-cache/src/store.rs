//! Cache Store
//!
//! Generation lifecycle on top of [`CacheStorage`]:
//!
//! ```text
//! Installing -> Installed -> Active -> Superseded -> Deleted
//! ```
//!
//! Install is all-or-nothing: every manifest asset is fetched before any
//! is written, so a failed install never leaves a partial cache behind.
//! Activate deletes every cache except the new generation's, whether or
//! not this store created it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use herald_net::{Fetcher, Request};

use crate::{CacheError, CacheGeneration, CacheHandle, CacheStorage, CachedResponse, GenerationState};

#[derive(Debug, Default)]
struct Lifecycle {
    generations: HashMap<String, (CacheGeneration, GenerationState)>,
    current: Option<String>,
}

/// Versioned cache store with a single current generation
#[derive(Debug, Default)]
pub struct CacheStore {
    storage: CacheStorage,
    lifecycle: Mutex<Lifecycle>,
}

impl CacheStore {
    pub fn new(storage: CacheStorage) -> Self {
        Self {
            storage,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    fn lifecycle(&self) -> Result<MutexGuard<'_, Lifecycle>, CacheError> {
        self.lifecycle
            .lock()
            .map_err(|_| CacheError::Unavailable("generation table lock poisoned".into()))
    }

    /// State of the generation stored under `name`
    pub fn state(&self, name: &str) -> Option<GenerationState> {
        self.lifecycle()
            .ok()?
            .generations
            .get(name)
            .map(|(_, state)| *state)
    }

    /// The generation currently answering lookups
    pub fn current(&self) -> Option<CacheGeneration> {
        let lifecycle = self.lifecycle().ok()?;
        let name = lifecycle.current.as_ref()?;
        lifecycle.generations.get(name).map(|(g, _)| g.clone())
    }

    /// Populate a new generation from the static asset manifest.
    ///
    /// Returns the number of assets cached.
    pub async fn install<F: Fetcher>(
        &self,
        generation: &CacheGeneration,
        manifest: &[String],
        fetcher: &F,
    ) -> Result<usize, CacheError> {
        {
            let mut lifecycle = self.lifecycle()?;
            if let Some((_, state)) = lifecycle.generations.get(&generation.name) {
                if matches!(state, GenerationState::Installing | GenerationState::Active) {
                    return Err(CacheError::InvalidTransition {
                        name: generation.name.clone(),
                        action: "install",
                        state: *state,
                    });
                }
            }
            lifecycle.generations.insert(
                generation.name.clone(),
                (generation.clone(), GenerationState::Installing),
            );
        }
        tracing::info!(cache = %generation.name, assets = manifest.len(), "Installing cache generation");

        let result = self.populate(generation, manifest, fetcher).await;

        let mut lifecycle = self.lifecycle()?;
        match result {
            Ok(count) => {
                lifecycle.generations.insert(
                    generation.name.clone(),
                    (generation.clone(), GenerationState::Installed),
                );
                tracing::info!(cache = %generation.name, count, "Cache generation installed");
                Ok(count)
            }
            Err(err) => {
                lifecycle.generations.remove(&generation.name);
                tracing::warn!(cache = %generation.name, error = %err, "Cache generation install failed");
                Err(err)
            }
        }
    }

    async fn populate<F: Fetcher>(
        &self,
        generation: &CacheGeneration,
        manifest: &[String],
        fetcher: &F,
    ) -> Result<usize, CacheError> {
        let mut fetched = Vec::with_capacity(manifest.len());
        for url in manifest {
            let resp = fetcher
                .fetch(&Request::get(url))
                .await
                .map_err(|e| CacheError::InstallFailed {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;
            if !resp.is_success() {
                return Err(CacheError::InstallFailed {
                    url: url.clone(),
                    reason: format!("HTTP {}", resp.status),
                });
            }
            fetched.push((url.clone(), CachedResponse::from(resp)));
        }

        // A stale cache under the same name is replaced wholesale
        self.storage.delete(&generation.name)?;
        let cache = self.storage.open(&generation.name)?;
        let count = fetched.len();
        if let Err(err) = cache.put_all(fetched) {
            self.storage.delete(&generation.name)?;
            return Err(err);
        }
        Ok(count)
    }

    /// Make `generation` current and delete every other cache.
    ///
    /// Returns the names of the deleted caches.
    pub fn activate(&self, generation: &CacheGeneration) -> Result<Vec<String>, CacheError> {
        let mut lifecycle = self.lifecycle()?;

        match lifecycle.generations.get(&generation.name).map(|(_, s)| *s) {
            Some(GenerationState::Installed) | Some(GenerationState::Active) => {}
            Some(state) => {
                return Err(CacheError::InvalidTransition {
                    name: generation.name.clone(),
                    action: "activate",
                    state,
                });
            }
            None => return Err(CacheError::UnknownGeneration(generation.name.clone())),
        }

        if let Some(previous) = lifecycle.current.clone() {
            if previous != generation.name {
                if let Some(entry) = lifecycle.generations.get_mut(&previous) {
                    entry.1 = GenerationState::Superseded;
                }
            }
        }

        let mut deleted = Vec::new();
        for name in self.storage.keys()? {
            if name != generation.name && self.storage.delete(&name)? {
                tracing::info!(cache = %name, "Deleted stale cache");
                deleted.push(name);
            }
        }

        for (name, entry) in lifecycle.generations.iter_mut() {
            if *name != generation.name {
                entry.1 = GenerationState::Deleted;
            }
        }
        lifecycle.generations.insert(
            generation.name.clone(),
            (generation.clone(), GenerationState::Active),
        );
        lifecycle.current = Some(generation.name.clone());

        tracing::info!(cache = %generation.name, deleted = deleted.len(), "Cache generation activated");
        Ok(deleted)
    }

    fn current_handle(&self) -> Result<CacheHandle, CacheError> {
        let name = self
            .lifecycle()?
            .current
            .clone()
            .ok_or(CacheError::NoCurrentGeneration)?;
        if !self.storage.has(&name)? {
            return Err(CacheError::NoSuchCache(name));
        }
        self.storage.open(&name)
    }

    /// Look up a URL in the current generation
    pub fn match_current(&self, url: &str) -> Result<Option<CachedResponse>, CacheError> {
        self.current_handle()?.match_url(url)
    }

    /// Store a response in the current generation
    pub fn put_current(&self, url: &str, response: CachedResponse) -> Result<(), CacheError> {
        self.current_handle()?.put(url, response)
    }

    /// Delete every cache, leaving no current generation.
    ///
    /// Returns the deleted cache names.
    pub fn clear_all(&self) -> Result<Vec<String>, CacheError> {
        let mut lifecycle = self.lifecycle()?;
        let mut deleted = Vec::new();
        for name in self.storage.keys()? {
            if self.storage.delete(&name)? {
                deleted.push(name);
            }
        }
        for entry in lifecycle.generations.values_mut() {
            entry.1 = GenerationState::Deleted;
        }
        lifecycle.current = None;
        tracing::info!(deleted = deleted.len(), "Cleared all caches");
        Ok(deleted)
    }
}
