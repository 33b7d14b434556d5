//! Event dispatcher and handlers

use std::cell::Cell;

use herald_cache::{CacheError, CacheStorage, CacheStore, CachedResponse};
use herald_net::{Fetcher, Request, Response};

use crate::push::notification_from_push;
use crate::strategy::{route, Route, Strategy};
use crate::{
    EventOutcome, FetchOutcome, MessageEvent, NotificationClickEvent, PushEvent, ResponseSource,
    ServiceWorkerState, WorkerConfig, WorkerError, WorkerEvent, WorkerHost, WorkerMessage,
    WorkerReply,
};

/// Service worker
pub struct ServiceWorker<F, H> {
    config: WorkerConfig,
    store: CacheStore,
    fetcher: F,
    host: H,
    state: Cell<ServiceWorkerState>,
}

impl<F: Fetcher, H: WorkerHost> ServiceWorker<F, H> {
    pub fn new(config: WorkerConfig, storage: CacheStorage, fetcher: F, host: H) -> Self {
        Self {
            config,
            store: CacheStore::new(storage),
            fetcher,
            host,
            state: Cell::new(ServiceWorkerState::Parsed),
        }
    }

    pub fn state(&self) -> ServiceWorkerState {
        self.state.get()
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Handle one event to completion
    pub async fn dispatch(&self, event: WorkerEvent) -> Result<EventOutcome, WorkerError> {
        tracing::debug!(event = event.kind(), "Dispatching worker event");

        match event {
            WorkerEvent::Install => self.on_install().await,
            WorkerEvent::Activate => self.on_activate().await,
            WorkerEvent::Fetch(request) => self.on_fetch(&request).await.map(EventOutcome::Fetch),
            WorkerEvent::Push(push) => self.on_push(push).await,
            WorkerEvent::NotificationClick(click) => self.on_notification_click(click).await,
            WorkerEvent::Message(message) => self.on_message(message).await,
        }
    }

    async fn on_install(&self) -> Result<EventOutcome, WorkerError> {
        self.state.set(ServiceWorkerState::Installing);
        let generation = self.config.generation();

        let cached = match self
            .store
            .install(&generation, &self.config.precache, &self.fetcher)
            .await
        {
            Ok(cached) => cached,
            Err(err) => {
                self.state.set(ServiceWorkerState::Redundant);
                return Err(err.into());
            }
        };
        self.state.set(ServiceWorkerState::Installed);

        self.host.skip_waiting().await?;
        Ok(EventOutcome::Installed {
            cache: generation.name,
            cached,
        })
    }

    async fn on_activate(&self) -> Result<EventOutcome, WorkerError> {
        self.state.set(ServiceWorkerState::Activating);

        let deleted = self.store.activate(&self.config.generation())?;
        let claimed = self.host.claim_clients().await?;

        self.state.set(ServiceWorkerState::Activated);
        tracing::info!(version = %self.config.version_tag, claimed, "Service worker activated");
        Ok(EventOutcome::Activated { deleted, claimed })
    }

    async fn on_fetch(&self, request: &Request) -> Result<FetchOutcome, WorkerError> {
        let Route { strategy, store_network } = route(request, &self.config);

        match strategy {
            Strategy::Passthrough => Ok(FetchOutcome::Passthrough),
            Strategy::NetworkOnly => {
                let response = self.fetcher.fetch(request).await?;
                Ok(respond(response, ResponseSource::Network))
            }
            Strategy::NetworkFirst => self.network_first(request, store_network).await,
            Strategy::CacheFirst => Ok(self.cache_first(request, store_network).await),
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
        }
    }

    async fn network_first(&self, request: &Request, store: bool) -> Result<FetchOutcome, WorkerError> {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if store && response.is_success() {
                    self.store_response(&request.url, &response);
                }
                Ok(respond(response, ResponseSource::Network))
            }
            Err(err) => match self.cached(&request.url) {
                Some(response) => {
                    tracing::debug!(url = %request.url, "Network failed, serving cached copy");
                    Ok(respond(response, ResponseSource::Cache))
                }
                None => Err(err.into()),
            },
        }
    }

    async fn cache_first(&self, request: &Request, store: bool) -> FetchOutcome {
        if let Some(response) = self.cached(&request.url) {
            tracing::debug!(url = %request.url, "Cache hit");
            return respond(response, ResponseSource::Cache);
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if store && response.is_success() {
                    self.store_response(&request.url, &response);
                }
                respond(response, ResponseSource::Network)
            }
            Err(err) => {
                tracing::warn!(url = %request.url, error = %err, "Serving offline placeholder");
                respond(self.offline_response(), ResponseSource::Offline)
            }
        }
    }

    async fn stale_while_revalidate(&self, request: &Request) -> Result<FetchOutcome, WorkerError> {
        let cached = self.cached(&request.url);

        let fresh = match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    self.store_response(&request.url, &response);
                }
                Ok(response)
            }
            Err(err) => Err(err),
        };

        match (cached, fresh) {
            (Some(response), _) => Ok(respond(response, ResponseSource::Cache)),
            (None, Ok(response)) => Ok(respond(response, ResponseSource::Network)),
            (None, Err(err)) => Err(err.into()),
        }
    }

    /// Current-generation lookup; any cache failure reads as a miss
    fn cached(&self, url: &str) -> Option<Response> {
        match self.store.match_current(url) {
            Ok(hit) => hit.map(|r| r.to_response()),
            Err(CacheError::NoCurrentGeneration) => None,
            Err(err) => {
                tracing::warn!(url, error = %err, "Cache unavailable, using network");
                None
            }
        }
    }

    fn store_response(&self, url: &str, response: &Response) {
        if let Err(err) = self.store.put_current(url, CachedResponse::from(response)) {
            tracing::warn!(url, error = %err, "Could not cache response");
        }
    }

    fn offline_response(&self) -> Response {
        Response::ok(self.config.offline_body.as_bytes().to_vec())
            .with_header("Content-Type", "text/plain; charset=utf-8")
    }

    async fn on_push(&self, push: PushEvent) -> Result<EventOutcome, WorkerError> {
        let payload = notification_from_push(push.data.as_deref(), &self.config.notification);
        let budget = self.config.push_budget();

        let show = self.host.show_notification(&payload);
        let deadline = async {
            smol::Timer::after(budget).await;
            Err(WorkerError::Timeout(budget))
        };
        smol::future::or(show, deadline).await?;

        tracing::info!(title = %payload.title, "Displayed push notification");
        Ok(EventOutcome::NotificationShown(payload))
    }

    async fn on_notification_click(&self, click: NotificationClickEvent) -> Result<EventOutcome, WorkerError> {
        let Some(notification) = click.notification else {
            tracing::debug!("Notification click without a notification");
            return Ok(EventOutcome::Ignored);
        };

        self.host.close_notification(&notification.tag).await;

        let url = match notification.payload.data.url.trim() {
            "" => self.config.notification.url.clone(),
            url => url.to_string(),
        };

        let clients = self.host.window_clients().await;
        if let Some(client) = clients.iter().find(|c| c.url == url) {
            self.host.focus_client(&client.id).await?;
            return Ok(EventOutcome::NotificationOpened { url, focused: true });
        }

        self.host.open_window(&url).await?;
        Ok(EventOutcome::NotificationOpened { url, focused: false })
    }

    async fn on_message(&self, message: MessageEvent) -> Result<EventOutcome, WorkerError> {
        let reply = match WorkerMessage::parse(&message.data) {
            WorkerMessage::SkipWaiting => {
                self.host.skip_waiting().await?;
                None
            }
            WorkerMessage::GetVersion => Some(WorkerReply::Version {
                version: self.config.version_tag.clone(),
                cache: self.config.generation().name,
            }),
            WorkerMessage::ClearCache => Some(WorkerReply::CacheCleared {
                deleted: self.store.clear_all()?,
            }),
            WorkerMessage::Unknown(kind) => {
                tracing::warn!(kind = ?kind, "Ignoring unknown worker message");
                None
            }
        };

        if let (Some(reply), Some(source)) = (&reply, &message.source) {
            self.host.post_message(source, reply).await?;
        }
        Ok(EventOutcome::Message(reply))
    }
}

fn respond(response: Response, source: ResponseSource) -> FetchOutcome {
    FetchOutcome::Respond { response, source }
}
