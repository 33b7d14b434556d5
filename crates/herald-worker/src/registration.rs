//! Service worker registrations (navigator.serviceWorker)

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Service worker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceWorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl fmt::Display for ServiceWorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

/// A registered service worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredWorker {
    pub id: u64,
    pub script_url: String,
    pub state: ServiceWorkerState,
}

/// Service worker registration
#[derive(Debug, Clone)]
pub struct ServiceWorkerRegistration {
    pub scope: String,
    pub installing: Option<RegisteredWorker>,
    pub waiting: Option<RegisteredWorker>,
    pub active: Option<RegisteredWorker>,
}

impl ServiceWorkerRegistration {
    /// Newest worker in the registration
    pub fn newest(&self) -> Option<&RegisteredWorker> {
        self.installing
            .as_ref()
            .or(self.waiting.as_ref())
            .or(self.active.as_ref())
    }
}

/// Service worker error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Security error: {0}")]
    SecurityError(String),

    #[error("No registration for scope: {0}")]
    NotFound(String),
}

/// Service worker container
#[derive(Debug, Default)]
pub struct ServiceWorkerContainer {
    registrations: HashMap<String, ServiceWorkerRegistration>,
    next_id: u64,
}

impl ServiceWorkerContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service worker.
    ///
    /// Re-registering a scope replaces its installing worker.
    pub fn register(&mut self, script_url: &str, scope: Option<&str>) -> Result<u64, RegistrationError> {
        let scope = scope
            .map(String::from)
            .unwrap_or_else(|| Self::default_scope(script_url));

        if !scope.starts_with('/') && !scope.starts_with("http") {
            return Err(RegistrationError::SecurityError(format!("invalid scope: {scope}")));
        }

        let id = self.next_id;
        self.next_id += 1;

        let worker = RegisteredWorker {
            id,
            script_url: script_url.to_string(),
            state: ServiceWorkerState::Installing,
        };

        let registration = self
            .registrations
            .entry(scope.clone())
            .or_insert_with(|| ServiceWorkerRegistration {
                scope,
                installing: None,
                waiting: None,
                active: None,
            });
        registration.installing = Some(worker);

        tracing::debug!(id, script_url, "Registered service worker");
        Ok(id)
    }

    /// Promote the installing worker of `scope` to active.
    ///
    /// The previously active worker becomes redundant and is returned.
    pub fn activate(&mut self, scope: &str) -> Result<Option<RegisteredWorker>, RegistrationError> {
        let registration = self
            .registrations
            .get_mut(scope)
            .ok_or_else(|| RegistrationError::NotFound(scope.to_string()))?;

        let mut worker = registration
            .installing
            .take()
            .or_else(|| registration.waiting.take())
            .ok_or_else(|| RegistrationError::NotFound(scope.to_string()))?;
        worker.state = ServiceWorkerState::Activated;

        let mut replaced = registration.active.replace(worker);
        if let Some(old) = replaced.as_mut() {
            old.state = ServiceWorkerState::Redundant;
            tracing::debug!(id = old.id, scope, "Service worker made redundant");
        }
        Ok(replaced)
    }

    /// Get registration for a URL
    pub fn get_registration(&self, url: &str) -> Option<&ServiceWorkerRegistration> {
        // Find the registration with the longest matching scope
        self.registrations
            .values()
            .filter(|reg| url.starts_with(&reg.scope))
            .max_by_key(|reg| reg.scope.len())
    }

    /// Unregister everything; returns how many registrations were removed
    pub fn unregister_all(&mut self) -> usize {
        let count = self.registrations.len();
        self.registrations.clear();
        count
    }

    /// Get all registrations, ordered by scope
    pub fn get_registrations(&self) -> Vec<&ServiceWorkerRegistration> {
        let mut regs: Vec<_> = self.registrations.values().collect();
        regs.sort_by(|a, b| a.scope.cmp(&b.scope));
        regs
    }

    fn default_scope(script_url: &str) -> String {
        // Default scope is the directory containing the script
        if let Some(pos) = script_url.rfind('/') {
            script_url[..=pos].to_string()
        } else {
            "/".to_string()
        }
    }
}
