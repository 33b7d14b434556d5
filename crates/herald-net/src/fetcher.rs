//! Network fetcher
//!
//! The service worker never talks to the network directly; it goes through
//! a [`Fetcher`] so the cache strategies can be driven by a fake in tests.

use std::time::Duration;

use crate::{Method, NetError, Request, Response};

/// Something that can perform a network request
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, NetError>;
}

impl<F: Fetcher> Fetcher for &F {
    async fn fetch(&self, request: &Request) -> Result<Response, NetError> {
        (**self).fetch(request).await
    }
}

/// Fetcher backed by a blocking reqwest client, run off the executor
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, NetError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("herald/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    fn execute(client: &reqwest::blocking::Client, request: Request) -> Result<Response, NetError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
            Method::Patch => reqwest::Method::PATCH,
        };

        let url = request.parsed_url()?;
        let mut builder = client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send().map_err(|e| NetError::Network(e.to_string()))?;
        let status = resp.status();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = resp.bytes().map_err(|e| NetError::Network(e.to_string()))?.to_vec();

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, NetError> {
        tracing::info!("HTTP {:?} {}", request.method, request.url);

        let client = self.client.clone();
        let request = request.clone();
        smol::unblock(move || Self::execute(&client, request)).await
    }
}
