// ABOUTME: Declaration of one application unit in the manifest.
// ABOUTME: Converts into the orchestrator's DeploymentUnit.

use serde::Deserialize;

use crate::plan::DeploymentUnit;
use crate::types::UnitName;

/// One application as declared in `kymata.yml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitDecl {
    #[serde(deserialize_with = "deserialize_unit_name")]
    pub name: UnitName,

    /// Rollout tier. Units in the same wave may proceed independently.
    #[serde(default)]
    pub wave: u32,

    /// Units that must be healthy before this one is triggered. May be
    /// stricter than the wave number, never looser.
    #[serde(default, deserialize_with = "deserialize_unit_names")]
    pub depends_on: Vec<UnitName>,

    /// Path within the manifest repository. Defaults to the unit name.
    #[serde(default)]
    pub path: Option<String>,

    /// Target namespace override for this unit.
    #[serde(default)]
    pub namespace: Option<String>,
}

impl UnitDecl {
    pub fn to_unit(&self) -> DeploymentUnit {
        DeploymentUnit {
            name: self.name.clone(),
            wave: self.wave,
            depends_on: self.depends_on.clone(),
        }
    }

    pub fn source_path(&self) -> &str {
        self.path.as_deref().unwrap_or_else(|| self.name.as_str())
    }
}

fn deserialize_unit_name<'de, D>(deserializer: D) -> Result<UnitName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    UnitName::new(&s).map_err(serde::de::Error::custom)
}

fn deserialize_unit_names<'de, D>(deserializer: D) -> Result<Vec<UnitName>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<String> = Vec::deserialize(deserializer)?;
    values
        .iter()
        .map(|s| UnitName::new(s).map_err(serde::de::Error::custom))
        .collect()
}
