//! Push relay
//!
//! Payloads are encrypted (aes128gcm) and VAPID-signed in process with the
//! `web-push` crate, then posted straight to the subscription's push
//! service endpoint. The private key never leaves this process.

use herald_common::PushSubscriptionRecord;
use herald_net::{Fetcher, HttpFetcher, NetError, Request};
use herald_vapid::VapidKeyPair;
use web_push::{
    ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushError, WebPushMessage,
    WebPushMessageBuilder,
};

use crate::PushError;

/// Seconds the push service keeps an undelivered message by default
pub const DEFAULT_TTL: u32 = 60 * 60 * 24;

/// Hands one payload to the push service for one subscription
#[allow(async_fn_in_trait)]
pub trait PushRelay {
    async fn send(
        &self,
        subscription: &PushSubscriptionRecord,
        payload_json: &str,
        vapid: &VapidKeyPair,
    ) -> Result<(), PushError>;
}

impl<R: PushRelay> PushRelay for &R {
    async fn send(
        &self,
        subscription: &PushSubscriptionRecord,
        payload_json: &str,
        vapid: &VapidKeyPair,
    ) -> Result<(), PushError> {
        (**self).send(subscription, payload_json, vapid).await
    }
}

fn delivery_failed(err: WebPushError) -> PushError {
    PushError::DeliveryFailed(err.to_string())
}

/// Encrypt and sign `payload_json` for one subscription
fn build_message(
    subscription: &PushSubscriptionRecord,
    payload_json: &str,
    vapid: &VapidKeyPair,
    ttl: u32,
) -> Result<WebPushMessage, PushError> {
    let info = SubscriptionInfo::new(
        &subscription.endpoint,
        &subscription.keys.p256dh,
        &subscription.keys.auth,
    );

    let mut signer = VapidSignatureBuilder::from_base64(vapid.private_key(), web_push::URL_SAFE_NO_PAD, &info).map_err(delivery_failed)?;
    signer.add_claim("sub", vapid.subject());
    let signature = signer.build().map_err(delivery_failed)?;

    let mut builder = WebPushMessageBuilder::new(&info);
    builder.set_ttl(ttl);
    builder.set_payload(ContentEncoding::Aes128Gcm, payload_json.as_bytes());
    builder.set_vapid_signature(signature);
    builder.build().map_err(delivery_failed)
}

/// Translate a built message into a push service request
fn to_request(message: WebPushMessage) -> Request {
    let mut request = Request::post(&message.endpoint.to_string()).with_header("TTL", &message.ttl.to_string());

    if let Some(payload) = message.payload {
        request = request
            .with_header("Content-Encoding", "aes128gcm")
            .with_header("Content-Type", "application/octet-stream");
        for (name, value) in &payload.crypto_headers {
            request = request.with_header(name, value);
        }
        request = request.with_body(payload.content);
    }
    request
}

/// Relay that talks to push services directly
#[derive(Debug, Clone)]
pub struct WebPushRelay<F = HttpFetcher> {
    ttl: u32,
    fetcher: F,
}

impl<F: Fetcher> WebPushRelay<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            ttl: DEFAULT_TTL,
            fetcher,
        }
    }

    /// Seconds the push service keeps an undelivered message
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }
}

impl<F: Fetcher> PushRelay for WebPushRelay<F> {
    async fn send(
        &self,
        subscription: &PushSubscriptionRecord,
        payload_json: &str,
        vapid: &VapidKeyPair,
    ) -> Result<(), PushError> {
        let message = build_message(subscription, payload_json, vapid, self.ttl)?;

        let response = self
            .fetcher
            .fetch(&to_request(message))
            .await
            .map_err(|e| PushError::DeliveryFailed(e.to_string()))?;

        match response.status {
            200..=299 => {
                tracing::debug!(endpoint = %subscription.endpoint, status = response.status, "Push service accepted message");
                Ok(())
            }
            404 | 410 => Err(PushError::DeliveryFailed(format!(
                "subscription expired ({})",
                response.status
            ))),
            status => Err(PushError::DeliveryFailed(NetError::HttpError { status }.to_string())),
        }
    }
}
