// ABOUTME: Orders deployment units into waves and validates dependency edges.
// ABOUTME: Runs entirely before any external call.

use std::collections::{BTreeMap, HashMap};

use super::error::ConfigurationError;
use super::unit::DeploymentUnit;
use crate::types::UnitName;

/// One rollout tier. Units within a wave carry no ordering constraint
/// between each other.
#[derive(Debug, Clone)]
pub struct Wave {
    pub number: u32,
    pub units: Vec<DeploymentUnit>,
}

/// A validated, wave-ordered execution plan.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    waves: Vec<Wave>,
}

impl ExecutionPlan {
    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn unit_count(&self) -> usize {
        self.waves.iter().map(|w| w.units.len()).sum()
    }
}

/// Validate a unit set and order it into waves.
///
/// Checks, in order: duplicate names, dependencies on unknown units,
/// dependency cycles, and dependencies that are not in a strictly earlier
/// wave. The first violation found is returned.
pub fn plan(units: &[DeploymentUnit]) -> Result<ExecutionPlan, ConfigurationError> {
    let mut by_name: HashMap<&UnitName, &DeploymentUnit> = HashMap::new();
    for unit in units {
        if by_name.insert(&unit.name, unit).is_some() {
            return Err(ConfigurationError::DuplicateUnit {
                unit: unit.name.clone(),
            });
        }
    }

    for unit in units {
        for dep in &unit.depends_on {
            if !by_name.contains_key(dep) {
                return Err(ConfigurationError::UnknownDependency {
                    unit: unit.name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }

    detect_cycle(units, &by_name)?;

    for unit in units {
        for dep in &unit.depends_on {
            let dep_unit = by_name[dep];
            if dep_unit.wave >= unit.wave {
                return Err(ConfigurationError::DependencyNotEarlier {
                    unit: unit.name.clone(),
                    unit_wave: unit.wave,
                    dependency: dep.clone(),
                    dependency_wave: dep_unit.wave,
                });
            }
        }
    }

    let mut grouped: BTreeMap<u32, Vec<DeploymentUnit>> = BTreeMap::new();
    for unit in units {
        grouped.entry(unit.wave).or_default().push(unit.clone());
    }

    let waves = grouped
        .into_iter()
        .map(|(number, units)| Wave { number, units })
        .collect();

    Ok(ExecutionPlan { waves })
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

fn detect_cycle(
    units: &[DeploymentUnit],
    by_name: &HashMap<&UnitName, &DeploymentUnit>,
) -> Result<(), ConfigurationError> {
    let mut marks: HashMap<&UnitName, Mark> = HashMap::new();

    for unit in units {
        if !marks.contains_key(&unit.name) {
            let mut path = Vec::new();
            visit(unit, by_name, &mut marks, &mut path)?;
        }
    }
    Ok(())
}

fn visit<'a>(
    unit: &'a DeploymentUnit,
    by_name: &HashMap<&UnitName, &'a DeploymentUnit>,
    marks: &mut HashMap<&'a UnitName, Mark>,
    path: &mut Vec<UnitName>,
) -> Result<(), ConfigurationError> {
    marks.insert(&unit.name, Mark::Visiting);
    path.push(unit.name.clone());

    for dep in &unit.depends_on {
        match marks.get(dep) {
            Some(Mark::Done) => continue,
            Some(Mark::Visiting) => {
                // Close the loop in the reported path.
                let start = path.iter().position(|n| n == dep).unwrap_or(0);
                let mut cycle: Vec<UnitName> = path[start..].to_vec();
                cycle.push(dep.clone());
                return Err(ConfigurationError::DependencyCycle { path: cycle });
            }
            None => visit(by_name[dep], by_name, marks, path)?,
        }
    }

    path.pop();
    marks.insert(&unit.name, Mark::Done);
    Ok(())
}
