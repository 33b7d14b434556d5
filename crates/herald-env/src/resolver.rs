//! Per-environment profiles and domain checks

use serde::{Deserialize, Serialize};

use crate::{DomainPattern, EnvError, Environment};

/// Settings for one deployment environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentProfile {
    pub environment: Environment,
    /// Push provider application id, if the provider needs one
    #[serde(default)]
    pub push_app_id: Option<String>,
    #[serde(default = "default_sw_path")]
    pub service_worker_path: String,
    #[serde(default = "default_sw_scope")]
    pub service_worker_scope: String,
    pub allowed_domains: Vec<DomainPattern>,
}

fn default_sw_path() -> String {
    "/sw.js".to_string()
}

fn default_sw_scope() -> String {
    "/".to_string()
}

impl EnvironmentProfile {
    pub fn new(environment: Environment, allowed: &[&str]) -> Self {
        Self {
            environment,
            push_app_id: None,
            service_worker_path: default_sw_path(),
            service_worker_scope: default_sw_scope(),
            allowed_domains: allowed.iter().map(|d| DomainPattern::parse(d)).collect(),
        }
    }

    pub fn with_push_app_id(mut self, app_id: &str) -> Self {
        self.push_app_id = Some(app_id.to_string());
        self
    }

    pub fn allows(&self, hostname: &str) -> bool {
        self.allowed_domains.iter().any(|p| p.matches(hostname))
    }
}

#[derive(Debug, Deserialize)]
struct ResolverFile {
    profiles: Vec<EnvironmentProfile>,
}

/// Static environment table
#[derive(Debug, Clone)]
pub struct EnvironmentResolver {
    production: EnvironmentProfile,
    development: EnvironmentProfile,
}

impl EnvironmentResolver {
    pub fn new(production: EnvironmentProfile, development: EnvironmentProfile) -> Self {
        Self { production, development }
    }

    /// Load profiles from a JSON document of the form `{"profiles": [...]}`.
    ///
    /// Both environments must be present.
    pub fn from_json(json: &str) -> Result<Self, EnvError> {
        let file: ResolverFile =
            serde_json::from_str(json).map_err(|e| EnvError::InvalidConfig(e.to_string()))?;

        let mut production = None;
        let mut development = None;
        for profile in file.profiles {
            match profile.environment {
                Environment::Production => production = Some(profile),
                Environment::Development => development = Some(profile),
            }
        }

        Ok(Self {
            production: production.ok_or(EnvError::MissingProfile(Environment::Production))?,
            development: development.ok_or(EnvError::MissingProfile(Environment::Development))?,
        })
    }

    pub fn profile(&self, env: Environment) -> &EnvironmentProfile {
        match env {
            Environment::Production => &self.production,
            Environment::Development => &self.development,
        }
    }

    /// Profile for the environment `hostname` belongs to
    pub fn profile_for(&self, hostname: &str) -> &EnvironmentProfile {
        self.profile(Environment::from_hostname(hostname))
    }

    pub fn allowed_domains(&self, env: Environment) -> &[DomainPattern] {
        &self.profile(env).allowed_domains
    }

    /// Check `hostname` against the allow-list of its own environment
    pub fn is_domain_allowed(&self, hostname: &str) -> bool {
        let env = Environment::from_hostname(hostname);
        let allowed = self.profile(env).allows(hostname);
        if !allowed {
            tracing::warn!(hostname, environment = %env, "Domain not in allow-list");
        }
        allowed
    }
}

impl Default for EnvironmentResolver {
    fn default() -> Self {
        Self {
            production: EnvironmentProfile::new(
                Environment::Production,
                &["sadtrans.netlify.app", "*.sadtrans.netlify.app"],
            ),
            development: EnvironmentProfile::new(
                Environment::Development,
                &["localhost", "127.0.0.1", "*.ngrok.io", "*.ngrok-free.app", "*.ngrok.app"],
            ),
        }
    }
}
