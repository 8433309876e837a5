// ABOUTME: The minimal named, orderable target of the orchestrator.
// ABOUTME: Wave number plus explicit dependency edges.

use crate::types::UnitName;

/// A declaratively-described rollout target.
///
/// Units in the same wave have no ordering constraint between each other;
/// `depends_on` may be stricter than the wave number but never looser.
#[derive(Debug, Clone)]
pub struct DeploymentUnit {
    pub name: UnitName,
    pub wave: u32,
    pub depends_on: Vec<UnitName>,
}

impl DeploymentUnit {
    pub fn new(name: UnitName, wave: u32) -> Self {
        Self {
            name,
            wave,
            depends_on: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, dependency: UnitName) -> Self {
        self.depends_on.push(dependency);
        self
    }
}
