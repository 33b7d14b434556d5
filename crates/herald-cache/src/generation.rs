//! Cache generations

use std::fmt;

/// One deployed build's cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheGeneration {
    /// Cache name in storage
    pub name: String,
    /// Deploy version this generation belongs to
    pub version_tag: String,
}

impl CacheGeneration {
    /// Generation whose cache is named after the version tag itself
    pub fn new(version_tag: &str) -> Self {
        Self {
            name: version_tag.to_string(),
            version_tag: version_tag.to_string(),
        }
    }

    /// Generation named `"{prefix}-{version_tag}"`
    pub fn prefixed(prefix: &str, version_tag: &str) -> Self {
        Self {
            name: format!("{prefix}-{version_tag}"),
            version_tag: version_tag.to_string(),
        }
    }
}

/// Lifecycle state of a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Installing,
    /// Populated but not serving
    Installed,
    /// The current generation
    Active,
    /// Replaced by a newer generation, pending deletion
    Superseded,
    Deleted,
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Active => "active",
            Self::Superseded => "superseded",
            Self::Deleted => "deleted",
        };
        f.write_str(s)
    }
}
