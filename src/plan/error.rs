// ABOUTME: Planning-phase configuration errors.
// ABOUTME: All are fatal and reported before any external call is made.

use crate::types::UnitName;
use thiserror::Error;

/// An invalid plan. Raised during validation, so an invalid unit set never
/// causes partial, unrecoverable side effects.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("duplicate deployment unit: {unit}")]
    DuplicateUnit { unit: UnitName },

    #[error("unit {unit} depends on unknown unit {dependency}")]
    UnknownDependency { unit: UnitName, dependency: UnitName },

    #[error(
        "unit {unit} (wave {unit_wave}) depends on {dependency} (wave {dependency_wave}), \
         which is not in an earlier wave"
    )]
    DependencyNotEarlier {
        unit: UnitName,
        unit_wave: u32,
        dependency: UnitName,
        dependency_wave: u32,
    },

    #[error("dependency cycle: {}", format_cycle(.path))]
    DependencyCycle { path: Vec<UnitName> },
}

impl ConfigurationError {
    /// The unit a sealed run should blame for the abort.
    pub fn unit(&self) -> &UnitName {
        match self {
            ConfigurationError::DuplicateUnit { unit } => unit,
            ConfigurationError::UnknownDependency { unit, .. } => unit,
            ConfigurationError::DependencyNotEarlier { unit, .. } => unit,
            ConfigurationError::DependencyCycle { path } => &path[0],
        }
    }
}

fn format_cycle(path: &[UnitName]) -> String {
    path.iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}
