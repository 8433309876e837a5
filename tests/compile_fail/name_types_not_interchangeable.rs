// ABOUTME: Compile-fail test verifying name types cannot be swapped.
// ABOUTME: An environment name is not a deployment unit name.

use kymata::plan::DeploymentUnit;
use kymata::types::EnvName;

fn main() {
    let environment = EnvName::new("prod").unwrap();

    // ERROR: DeploymentUnit::new expects a UnitName, not an EnvName
    let _unit = DeploymentUnit::new(environment, 0);
}
