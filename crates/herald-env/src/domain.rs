//! Allow-listed domain patterns

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A domain allow-list entry.
///
/// `*.example.com` matches any subdomain of `example.com` but not the apex;
/// anything else must equal the host name exactly (ASCII case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainPattern {
    Exact(String),
    Suffix(String),
}

impl DomainPattern {
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim().to_ascii_lowercase();
        match pattern.strip_prefix("*.") {
            Some(rest) => Self::Suffix(format!(".{rest}")),
            None => Self::Exact(pattern),
        }
    }

    pub fn matches(&self, hostname: &str) -> bool {
        let host = hostname.trim().to_ascii_lowercase();
        match self {
            Self::Exact(domain) => host == *domain,
            Self::Suffix(suffix) => host.len() > suffix.len() && host.ends_with(suffix.as_str()),
        }
    }
}

impl fmt::Display for DomainPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(domain) => f.write_str(domain),
            Self::Suffix(suffix) => write!(f, "*{suffix}"),
        }
    }
}

impl Serialize for DomainPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DomainPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
