//! Herald Environment
//!
//! Maps a host name to its deployment environment and checks it against
//! the environment's allow-listed domains. Everything here is a pure
//! function of the host name handed in by the caller.

mod domain;
mod environment;
mod resolver;

pub use domain::DomainPattern;
pub use environment::Environment;
pub use resolver::{EnvironmentProfile, EnvironmentResolver};

/// Environment configuration error
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("Invalid environment config: {0}")]
    InvalidConfig(String),

    #[error("No profile for environment: {0}")]
    MissingProfile(Environment),
}
