//! Diagnostics toolkit

use herald_common::{NotificationPayload, NotificationPermission};
use herald_env::{Environment, EnvironmentResolver};
use herald_vapid::VapidKeyPair;
use herald_worker::{ServiceWorkerContainer, ServiceWorkerState};
use serde::Serialize;

use crate::{BrowserSubscription, DiagnosticsError, PageHost, PlatformFeatures, WebStorage};

/// Storage key namespace used by the push provider SDK
const DEFAULT_PROVIDER_NAMESPACE: &str = "onesignal";

/// One service worker registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationReport {
    pub scope: String,
    pub script_url: Option<String>,
    pub state: Option<ServiceWorkerState>,
}

/// What the resolver makes of the current host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentReport {
    pub hostname: String,
    pub environment: Environment,
    pub domain_allowed: bool,
    pub push_app_id: Option<String>,
    pub service_worker_path: String,
    pub service_worker_scope: String,
}

/// Everything the toolkit can see, in one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticsReport {
    pub environment: EnvironmentReport,
    pub features: PlatformFeatures,
    pub permission: NotificationPermission,
    pub registrations: Vec<RegistrationReport>,
    pub provider_keys: Vec<String>,
}

/// Diagnostics attached to one page
pub struct Diagnostics<P> {
    page: P,
    resolver: EnvironmentResolver,
    vapid: VapidKeyPair,
    container: ServiceWorkerContainer,
    storage: WebStorage,
    provider_namespace: String,
}

impl<P: PageHost> Diagnostics<P> {
    pub fn new(page: P, resolver: EnvironmentResolver, vapid: VapidKeyPair) -> Self {
        Self {
            page,
            resolver,
            vapid,
            container: ServiceWorkerContainer::new(),
            storage: WebStorage::new(),
            provider_namespace: DEFAULT_PROVIDER_NAMESPACE.to_string(),
        }
    }

    pub fn with_container(mut self, container: ServiceWorkerContainer) -> Self {
        self.container = container;
        self
    }

    pub fn with_storage(mut self, storage: WebStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_provider_namespace(mut self, namespace: &str) -> Self {
        self.provider_namespace = namespace.to_string();
        self
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn container(&self) -> &ServiceWorkerContainer {
        &self.container
    }

    pub fn storage(&self) -> &WebStorage {
        &self.storage
    }

    fn origin(&self) -> String {
        self.page.hostname()
    }

    // === Inspection ===

    pub fn registrations(&self) -> Vec<RegistrationReport> {
        self.container
            .get_registrations()
            .into_iter()
            .map(|reg| {
                let newest = reg.newest();
                RegistrationReport {
                    scope: reg.scope.clone(),
                    script_url: newest.map(|w| w.script_url.clone()),
                    state: newest.map(|w| w.state),
                }
            })
            .collect()
    }

    pub fn permission(&self) -> NotificationPermission {
        self.page.permission()
    }

    pub fn environment_report(&self) -> EnvironmentReport {
        let hostname = self.page.hostname();
        let profile = self.resolver.profile_for(&hostname);
        EnvironmentReport {
            environment: profile.environment,
            domain_allowed: self.resolver.is_domain_allowed(&hostname),
            push_app_id: profile.push_app_id.clone(),
            service_worker_path: profile.service_worker_path.clone(),
            service_worker_scope: profile.service_worker_scope.clone(),
            hostname,
        }
    }

    /// Provider-owned storage keys, local then session
    pub fn provider_keys(&self) -> Vec<String> {
        let origin = self.origin();
        let needle = self.provider_namespace.to_lowercase();
        [crate::StorageArea::Local, crate::StorageArea::Session]
            .into_iter()
            .flat_map(|area| self.storage.keys(area, &origin))
            .filter(|key| key.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn report(&self) -> DiagnosticsReport {
        DiagnosticsReport {
            environment: self.environment_report(),
            features: self.page.features(),
            permission: self.permission(),
            registrations: self.registrations(),
            provider_keys: self.provider_keys(),
        }
    }

    // === Repairs ===

    /// Remove every service worker registration
    pub fn unregister_all(&mut self) -> usize {
        let removed = self.container.unregister_all();
        tracing::info!(removed, "Unregistered service workers");
        removed
    }

    /// Remove the provider's local and session storage keys
    pub fn clear_provider_storage(&mut self) -> Vec<String> {
        let origin = self.origin();
        let removed = self.storage.remove_matching(&origin, &self.provider_namespace);
        tracing::info!(origin = %origin, removed = removed.len(), "Cleared provider storage");
        removed
    }

    /// Clear provider state and subscribe again with the server key
    pub async fn resubscribe(&mut self) -> Result<BrowserSubscription, DiagnosticsError> {
        if !self.page.features().push_manager {
            return Err(DiagnosticsError::Unsupported("PushManager"));
        }
        self.ensure_permission().await?;

        self.clear_provider_storage();
        let key = self.vapid.application_server_key()?;
        let subscription = self.page.subscribe(&key).await?;

        tracing::info!(endpoint = %subscription.endpoint, "Resubscribed to push");
        Ok(subscription)
    }

    /// Show a local notification to check the display path
    pub async fn send_test_notification(&self) -> Result<NotificationPayload, DiagnosticsError> {
        if !self.page.features().notifications {
            return Err(DiagnosticsError::Unsupported("Notification"));
        }
        self.ensure_permission().await?;

        let payload = NotificationPayload::new("Test notification", "Push notifications are working")
            .with_url("/");
        self.page.show_notification(&payload).await?;
        Ok(payload)
    }

    /// Ask once when undecided; a denial is final
    async fn ensure_permission(&self) -> Result<(), DiagnosticsError> {
        let permission = match self.page.permission() {
            NotificationPermission::Default => self.page.request_permission().await,
            decided => decided,
        };

        if permission.is_granted() {
            Ok(())
        } else {
            tracing::warn!(?permission, "Notification permission not granted");
            Err(DiagnosticsError::PermissionDenied)
        }
    }
}
