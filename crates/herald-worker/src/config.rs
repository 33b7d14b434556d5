//! Worker configuration
//!
//! Everything the worker script used to keep in top-level constants lives
//! here and is handed to [`ServiceWorker::new`](crate::ServiceWorker::new).

use std::time::Duration;

use herald_cache::CacheGeneration;
use herald_env::DomainPattern;
use serde::{Deserialize, Serialize};

use crate::{Strategy, WorkerError};

/// A host-based runtime caching rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeRule {
    pub host: DomainPattern,
    pub strategy: Strategy,
}

impl RuntimeRule {
    pub fn new(host: &str, strategy: Strategy) -> Self {
        Self {
            host: DomainPattern::parse(host),
            strategy,
        }
    }
}

/// Defaults applied to push payloads missing a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationDefaults {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub url: String,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: "New notification".to_string(),
            body: String::new(),
            icon: Some("/icons/icon-192x192.png".to_string()),
            badge: Some("/icons/badge-72x72.png".to_string()),
            url: "/".to_string(),
        }
    }
}

/// Service worker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Cache name prefix; empty means the cache is named by the tag alone
    pub cache_prefix: String,
    /// Bumped on every deploy that must evict old caches
    pub version_tag: String,
    /// Static assets cached on install
    pub precache: Vec<String>,
    /// Requests to this host (or its subdomains) are never intercepted
    pub api_host_suffix: Option<String>,
    pub runtime_rules: Vec<RuntimeRule>,
    /// Body of the synthetic response served when offline
    pub offline_body: String,
    pub notification: NotificationDefaults,
    /// Time allowed for displaying a push notification
    pub push_budget_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_prefix: "herald-static".to_string(),
            version_tag: "v1".to_string(),
            precache: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/manifest.json".to_string(),
            ],
            api_host_suffix: None,
            runtime_rules: vec![
                RuntimeRule::new("cdn.onesignal.com", Strategy::NetworkOnly),
                RuntimeRule::new("onesignal.com", Strategy::StaleWhileRevalidate),
                RuntimeRule::new("fonts.googleapis.com", Strategy::CacheFirst),
                RuntimeRule::new("fonts.gstatic.com", Strategy::CacheFirst),
            ],
            offline_body: "Offline content".to_string(),
            notification: NotificationDefaults::default(),
            push_budget_ms: 10_000,
        }
    }
}

impl WorkerConfig {
    pub fn from_json(json: &str) -> Result<Self, WorkerError> {
        serde_json::from_str(json).map_err(|e| WorkerError::Config(e.to_string()))
    }

    pub fn with_version(mut self, tag: &str) -> Self {
        self.version_tag = tag.to_string();
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.cache_prefix = prefix.to_string();
        self
    }

    pub fn with_precache(mut self, urls: &[&str]) -> Self {
        self.precache = urls.iter().map(|u| u.to_string()).collect();
        self
    }

    pub fn with_api_host(mut self, suffix: &str) -> Self {
        self.api_host_suffix = Some(suffix.to_string());
        self
    }

    pub fn with_rules(mut self, rules: Vec<RuntimeRule>) -> Self {
        self.runtime_rules = rules;
        self
    }

    /// The generation this deploy installs
    pub fn generation(&self) -> CacheGeneration {
        if self.cache_prefix.is_empty() {
            CacheGeneration::new(&self.version_tag)
        } else {
            CacheGeneration::prefixed(&self.cache_prefix, &self.version_tag)
        }
    }

    pub fn push_budget(&self) -> Duration {
        Duration::from_millis(self.push_budget_ms)
    }
}
