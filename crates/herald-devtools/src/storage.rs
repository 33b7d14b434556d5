//! Web storage
//!
//! localStorage and sessionStorage, keyed by origin.

use std::collections::{BTreeMap, HashMap};

/// Which storage area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Local,
    Session,
}

/// Per-origin local and session storage
#[derive(Debug, Clone, Default)]
pub struct WebStorage {
    local: HashMap<String, BTreeMap<String, String>>,
    session: HashMap<String, BTreeMap<String, String>>,
}

impl WebStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn area(&self, area: StorageArea) -> &HashMap<String, BTreeMap<String, String>> {
        match area {
            StorageArea::Local => &self.local,
            StorageArea::Session => &self.session,
        }
    }

    fn area_mut(&mut self, area: StorageArea) -> &mut HashMap<String, BTreeMap<String, String>> {
        match area {
            StorageArea::Local => &mut self.local,
            StorageArea::Session => &mut self.session,
        }
    }

    pub fn set(&mut self, area: StorageArea, origin: &str, key: &str, value: &str) {
        self.area_mut(area)
            .entry(origin.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, area: StorageArea, origin: &str, key: &str) -> Option<&str> {
        self.area(area).get(origin)?.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, area: StorageArea, origin: &str, key: &str) -> Option<String> {
        self.area_mut(area).get_mut(origin)?.remove(key)
    }

    /// Keys stored for `origin`, sorted
    pub fn keys(&self, area: StorageArea, origin: &str) -> Vec<String> {
        self.area(area)
            .get(origin)
            .map(|items| items.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, area: StorageArea, origin: &str) -> usize {
        self.area(area).get(origin).map_or(0, BTreeMap::len)
    }

    /// Clear one origin's items in `area`
    pub fn clear(&mut self, area: StorageArea, origin: &str) {
        if let Some(items) = self.area_mut(area).get_mut(origin) {
            items.clear();
        }
    }

    /// Remove every key in both areas whose name contains `needle`,
    /// ignoring case. Returns the removed keys, local first.
    pub fn remove_matching(&mut self, origin: &str, needle: &str) -> Vec<String> {
        let needle = needle.to_lowercase();
        let mut removed = Vec::new();
        for area in [StorageArea::Local, StorageArea::Session] {
            if let Some(items) = self.area_mut(area).get_mut(origin) {
                items.retain(|key, _| {
                    let hit = key.to_lowercase().contains(&needle);
                    if hit {
                        removed.push(key.clone());
                    }
                    !hit
                });
            }
        }
        removed
    }

    /// Drop all session storage, as when the browser closes
    pub fn clear_sessions(&mut self) {
        self.session.clear();
    }
}
