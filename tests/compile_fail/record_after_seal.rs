// ABOUTME: Compile-fail test verifying a sealed run cannot be mutated.
// ABOUTME: This test should fail to compile, validating run immutability.

use kymata::gitops::{HealthState, SyncState};
use kymata::plan::{DeploymentRun, UnitOutcome};
use kymata::types::UnitName;

fn main() {
    let run = DeploymentRun::start();
    let sealed = run.seal_success();

    let outcome = UnitOutcome {
        final_sync_state: SyncState::Synced,
        final_health_state: HealthState::Healthy,
        attempts: 1,
        trigger_method: None,
        degraded_observations: 0,
        error: None,
    };

    // ERROR: record_unit() doesn't exist on DeploymentRun<Sealed>
    sealed.record_unit(UnitName::new("storage").unwrap(), outcome);
}
