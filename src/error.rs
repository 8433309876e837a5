// ABOUTME: Application-wide error types for kymata.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::UnitName;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no operator units declared in the manifest")]
    NoOperators,

    #[error("run aborted at {unit}: {reason}")]
    Aborted { unit: UnitName, reason: String },

    #[error("provisioning failed: {0}")]
    Provision(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Api(#[from] crate::gitops::ApiError),

    #[error(transparent)]
    Lock(#[from] crate::plan::LockError),
}

pub type Result<T> = std::result::Result<T, Error>;
