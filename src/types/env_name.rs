// ABOUTME: Validated environment names used for config overrides and run locks.
// ABOUTME: Environment names appear in lock file paths, so the character set is strict.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvNameError {
    #[error("environment name cannot be empty")]
    Empty,

    #[error("invalid character in environment name: '{0}'")]
    InvalidChar(char),
}

/// Name of a target environment (e.g. "dev", "stage-eu", "prod").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvName(String);

impl EnvName {
    pub fn new(value: &str) -> Result<Self, EnvNameError> {
        if value.is_empty() {
            return Err(EnvNameError::Empty);
        }

        for c in value.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '_' {
                return Err(EnvNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
