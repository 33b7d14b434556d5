//! Edge case tests for herald-devtools
//!
//! Permission prompting, repairs and feature detection against a fake page.

use std::cell::{Cell, RefCell};

use herald_common::{NotificationPayload, NotificationPermission, SubscriptionKeys};
use herald_devtools::*;
use herald_env::EnvironmentResolver;
use herald_vapid::VapidKeyPair;
use herald_worker::ServiceWorkerContainer;

const HOST: &str = "sadtrans.netlify.app";

struct FakePage {
    features: PlatformFeatures,
    permission: Cell<NotificationPermission>,
    /// Decision returned when the user is prompted
    answer: NotificationPermission,
    prompts: Cell<usize>,
    shown: RefCell<Vec<NotificationPayload>>,
    subscribed_with: RefCell<Option<Vec<u8>>>,
    /// Push service refuses new subscriptions
    reject_subscribe: bool,
}

impl FakePage {
    fn new(permission: NotificationPermission, answer: NotificationPermission) -> Self {
        Self {
            features: PlatformFeatures::all(),
            permission: Cell::new(permission),
            answer,
            prompts: Cell::new(0),
            shown: RefCell::new(Vec::new()),
            subscribed_with: RefCell::new(None),
            reject_subscribe: false,
        }
    }
}

impl PageHost for FakePage {
    fn hostname(&self) -> String {
        HOST.to_string()
    }

    fn features(&self) -> PlatformFeatures {
        self.features
    }

    fn permission(&self) -> NotificationPermission {
        self.permission.get()
    }

    async fn request_permission(&self) -> NotificationPermission {
        self.prompts.set(self.prompts.get() + 1);
        self.permission.set(self.answer);
        self.answer
    }

    async fn show_notification(&self, payload: &NotificationPayload) -> Result<(), DiagnosticsError> {
        self.shown.borrow_mut().push(payload.clone());
        Ok(())
    }

    async fn subscribe(&self, key: &[u8]) -> Result<BrowserSubscription, DiagnosticsError> {
        *self.subscribed_with.borrow_mut() = Some(key.to_vec());
        if self.reject_subscribe {
            return Err(DiagnosticsError::Host("push service unavailable".into()));
        }
        Ok(BrowserSubscription {
            endpoint: "https://push.test/fresh".into(),
            keys: SubscriptionKeys {
                p256dh: "p".into(),
                auth: "a".into(),
            },
        })
    }
}

fn public_key() -> String {
    let mut bytes = vec![0x04u8];
    bytes.extend(1..=65u8);
    herald_vapid::key_to_url_safe_base64(&bytes)
}

fn diagnostics(page: FakePage) -> Diagnostics<FakePage> {
    let vapid = VapidKeyPair::new(&public_key(), &"A".repeat(43), "mailto:ops@example.com").unwrap();
    Diagnostics::new(page, EnvironmentResolver::default(), vapid)
}

fn provider_storage() -> WebStorage {
    let mut storage = WebStorage::new();
    storage.set(StorageArea::Local, HOST, "OneSignalSDK.userId", "123");
    storage.set(StorageArea::Local, HOST, "auth-token", "t");
    storage.set(StorageArea::Session, HOST, "onesignal-pageViews", "4");
    storage
}

// ============================================================================
// PERMISSION TESTS
// ============================================================================

#[test]
fn test_undecided_permission_prompts_once() {
    let diag = diagnostics(FakePage::new(NotificationPermission::Default, NotificationPermission::Granted));

    smol::block_on(diag.send_test_notification()).unwrap();
    smol::block_on(diag.send_test_notification()).unwrap();

    assert_eq!(diag.page().prompts.get(), 1);
    assert_eq!(diag.page().shown.borrow().len(), 2);
}

#[test]
fn test_prompt_declined() {
    let diag = diagnostics(FakePage::new(NotificationPermission::Default, NotificationPermission::Denied));

    let err = smol::block_on(diag.send_test_notification()).unwrap_err();
    assert!(matches!(err, DiagnosticsError::PermissionDenied));
    assert!(diag.page().shown.borrow().is_empty());
}

#[test]
fn test_denied_permission_never_prompts() {
    let diag = diagnostics(FakePage::new(NotificationPermission::Denied, NotificationPermission::Granted));

    let err = smol::block_on(diag.send_test_notification()).unwrap_err();
    assert!(matches!(err, DiagnosticsError::PermissionDenied));
    assert_eq!(diag.page().prompts.get(), 0);
}

#[test]
fn test_notifications_unsupported() {
    let mut page = FakePage::new(NotificationPermission::Granted, NotificationPermission::Granted);
    page.features.notifications = false;
    let diag = diagnostics(page);

    let err = smol::block_on(diag.send_test_notification()).unwrap_err();
    assert!(matches!(err, DiagnosticsError::Unsupported("Notification")));
}

// ============================================================================
// REPAIR TESTS
// ============================================================================

#[test]
fn test_clear_provider_storage() {
    let mut diag = diagnostics(FakePage::new(NotificationPermission::Granted, NotificationPermission::Granted))
        .with_storage(provider_storage());
    assert_eq!(diag.provider_keys().len(), 2);

    let removed = diag.clear_provider_storage();
    assert_eq!(removed, vec!["OneSignalSDK.userId".to_string(), "onesignal-pageViews".to_string()]);
    assert_eq!(diag.storage().get(StorageArea::Local, HOST, "auth-token"), Some("t"));
    assert!(diag.provider_keys().is_empty());
}

#[test]
fn test_resubscribe_uses_server_key() {
    let mut diag = diagnostics(FakePage::new(NotificationPermission::Granted, NotificationPermission::Granted))
        .with_storage(provider_storage());

    let subscription = smol::block_on(diag.resubscribe()).unwrap();
    assert_eq!(subscription.endpoint, "https://push.test/fresh");

    let key = diag.page().subscribed_with.borrow().clone().unwrap();
    assert_eq!(key.len(), 66);
    assert_eq!(key[0], 0x04);
    assert!(diag.provider_keys().is_empty());
}

#[test]
fn test_resubscribe_denied_keeps_storage() {
    let mut diag = diagnostics(FakePage::new(NotificationPermission::Denied, NotificationPermission::Denied))
        .with_storage(provider_storage());

    assert!(matches!(smol::block_on(diag.resubscribe()), Err(DiagnosticsError::PermissionDenied)));
    assert_eq!(diag.provider_keys().len(), 2);
}

#[test]
fn test_resubscribe_page_failure_surfaces() {
    let mut page = FakePage::new(NotificationPermission::Granted, NotificationPermission::Granted);
    page.reject_subscribe = true;
    let mut diag = diagnostics(page);

    let err = smol::block_on(diag.resubscribe()).unwrap_err();
    assert!(matches!(err, DiagnosticsError::Host(ref msg) if msg == "push service unavailable"));
}

#[test]
fn test_unregister_all() {
    let mut container = ServiceWorkerContainer::new();
    container.register("/sw.js", None).unwrap();
    container.register("/OneSignalSDKWorker.js", Some("/push/")).unwrap();

    let mut diag = diagnostics(FakePage::new(NotificationPermission::Granted, NotificationPermission::Granted))
        .with_container(container);
    assert_eq!(diag.registrations().len(), 2);

    assert_eq!(diag.unregister_all(), 2);
    assert!(diag.registrations().is_empty());
    assert!(diag.report().registrations.is_empty());
}

#[test]
fn test_report_production_host() {
    let diag = diagnostics(FakePage::new(NotificationPermission::Default, NotificationPermission::Granted));
    let report = diag.report();

    assert_eq!(report.environment.hostname, HOST);
    assert!(report.environment.domain_allowed);
    assert_eq!(report.permission, NotificationPermission::Default);
    // Inspection never prompts
    assert_eq!(diag.page().prompts.get(), 0);
}
