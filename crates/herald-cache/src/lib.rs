//! Herald Cache
//!
//! Named caches of request/response pairs and the generation lifecycle
//! that keeps exactly one of them current per deployment.

mod generation;
mod storage;
mod store;

pub use generation::{CacheGeneration, GenerationState};
pub use storage::{CacheHandle, CacheStorage, CachedResponse};
pub use store::CacheStore;

/// Cache error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Storage quota or lock failure; callers fall back to the network
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("No such cache: {0}")]
    NoSuchCache(String),

    #[error("Install failed while fetching {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("No current cache generation")]
    NoCurrentGeneration,

    #[error("Unknown cache generation: {0}")]
    UnknownGeneration(String),

    #[error("Cannot {action} generation {name} while {state}")]
    InvalidTransition {
        name: String,
        action: &'static str,
        state: GenerationState,
    },
}
