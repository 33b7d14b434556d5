//! Fetch routing
//!
//! Decides, per request, whether the worker answers it and from where.

use herald_net::{Method, Request};
use serde::{Deserialize, Serialize};

use crate::WorkerConfig;

/// Response strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Not intercepted; the browser goes to the network itself
    Passthrough,
    /// Network only; never consult or fill the cache
    NetworkOnly,
    /// Network, storing successes; cache on failure
    NetworkFirst,
    /// Cache, then network, then the offline placeholder
    CacheFirst,
    /// Serve the cached copy and refresh it from the network
    StaleWhileRevalidate,
}

/// Routing decision for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub strategy: Strategy,
    /// Whether successful network responses are written to the cache
    pub store_network: bool,
}

impl Route {
    fn new(strategy: Strategy, store_network: bool) -> Self {
        Self { strategy, store_network }
    }
}

/// Route a request.
///
/// Order: non-GET and API host requests pass through, then runtime rules,
/// then stylesheets go network-first, everything else cache-first.
pub fn route(request: &Request, config: &WorkerConfig) -> Route {
    if request.method != Method::Get {
        return Route::new(Strategy::Passthrough, false);
    }

    let (host, path) = match request.parsed_url() {
        Ok(url) => (url.host_str().map(str::to_ascii_lowercase), url.path().to_string()),
        Err(_) => (None, strip_query(&request.url).to_string()),
    };

    if let (Some(host), Some(api)) = (host.as_deref(), config.api_host_suffix.as_deref()) {
        if is_host_or_subdomain(host, api) {
            return Route::new(Strategy::Passthrough, false);
        }
    }

    if let Some(host) = host.as_deref() {
        if let Some(rule) = config.runtime_rules.iter().find(|r| r.host.matches(host)) {
            let store = matches!(
                rule.strategy,
                Strategy::NetworkFirst | Strategy::CacheFirst | Strategy::StaleWhileRevalidate
            );
            return Route::new(rule.strategy, store);
        }
    }

    if path.to_ascii_lowercase().ends_with(".css") {
        Route::new(Strategy::NetworkFirst, true)
    } else {
        Route::new(Strategy::CacheFirst, false)
    }
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

fn is_host_or_subdomain(host: &str, suffix: &str) -> bool {
    let suffix = suffix.trim_start_matches('.').to_ascii_lowercase();
    host == suffix
        || (host.len() > suffix.len()
            && host.ends_with(&suffix)
            && host.as_bytes()[host.len() - suffix.len() - 1] == b'.')
}
