// ABOUTME: Manifest types and parsing for kymata.yml.
// ABOUTME: Handles YAML parsing, token resolution, and environment merging.

mod env_value;
mod timing;
mod unit_decl;

pub use env_value::EnvValue;
pub use timing::{Timing, TimingConfig, derive_poll_interval};
pub use unit_decl::UnitDecl;

use crate::error::{Error, Result};
use crate::types::EnvName;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "kymata.yml";
pub const CONFIG_FILENAME_ALT: &str = "kymata.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".kymata/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Reconciliation API endpoint (`http://host:port`).
    pub server: String,

    /// Bearer token for the API, usually an env var reference.
    #[serde(default)]
    pub token: Option<EnvValue>,

    #[serde(default = "default_project")]
    pub project: String,

    pub repo: RepoConfig,

    #[serde(default)]
    pub destination: DestinationConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub trigger: TriggerMode,

    /// Operator-installation units converged by `operators setup`.
    #[serde(default)]
    pub operators: Vec<UnitDecl>,

    #[serde(deserialize_with = "deserialize_units")]
    pub applications: NonEmpty<UnitDecl>,

    #[serde(default)]
    pub environments: HashMap<String, Environment>,
}

/// Source repository holding the declarative manifests.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoConfig {
    pub url: String,

    #[serde(default = "default_revision")]
    pub revision: String,
}

/// Cluster and namespace applications are deployed into.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationConfig {
    #[serde(default = "default_dest_server")]
    pub server: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            server: default_dest_server(),
            namespace: default_namespace(),
        }
    }
}

/// Which trigger mechanism to use. `Auto` composes the client trigger with
/// the patch fallback; the others pin a single mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    #[default]
    Auto,
    Client,
    Patch,
}

/// Per-environment overrides, merged over the base config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default)]
    pub token: Option<EnvValue>,

    #[serde(default)]
    pub timing: Option<TimingConfig>,

    #[serde(default)]
    pub destination: Option<DestinationConfig>,

    #[serde(default)]
    pub revision: Option<String>,

    #[serde(default, deserialize_with = "deserialize_units_option")]
    pub applications: Option<NonEmpty<UnitDecl>>,
}

fn default_project() -> String {
    "default".to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_dest_server() -> String {
    "https://kubernetes.default.svc".to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Apply an environment's overrides over the base config.
    pub fn for_environment(&self, name: &str) -> Result<Config> {
        let env = self
            .environments
            .get(name)
            .ok_or_else(|| Error::UnknownEnvironment(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(ref server) = env.server {
            merged.server = server.clone();
        }

        if env.token.is_some() {
            merged.token = env.token.clone();
        }

        if let Some(ref timing) = env.timing {
            merged.timing = timing.clone();
        }

        if let Some(ref destination) = env.destination {
            merged.destination = destination.clone();
        }

        if let Some(ref revision) = env.revision {
            merged.repo.revision = revision.clone();
        }

        if let Some(ref applications) = env.applications {
            merged.applications = applications.clone();
        }

        Ok(merged)
    }

    /// Resolve the API token, if one is configured.
    pub fn resolve_token(&self) -> Result<Option<String>> {
        match &self.token {
            Some(value) => value.resolve().map(Some),
            None => Ok(None),
        }
    }
}

/// Immutable per-run settings, constructed once by the command entry point
/// and passed explicitly through planner, orchestrator, and gate.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub environment: EnvName,
    pub dry_run: bool,
    pub timing: Timing,
}

fn deserialize_units<'de, D>(deserializer: D) -> std::result::Result<NonEmpty<UnitDecl>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<UnitDecl> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(values)
        .ok_or_else(|| serde::de::Error::custom("at least one application is required"))
}

fn deserialize_units_option<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NonEmpty<UnitDecl>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<Vec<UnitDecl>> = Option::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(values) => {
            let nonempty = NonEmpty::from_vec(values).ok_or_else(|| {
                serde::de::Error::custom("environment applications list cannot be empty")
            })?;
            Ok(Some(nonempty))
        }
    }
}
