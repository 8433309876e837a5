// ABOUTME: Drives the execution plan wave by wave.
// ABOUTME: A unit that fails to converge permanently halts wave progression.

use std::sync::Arc;

use futures::future::join_all;

use super::gate::{GateResult, HealthGate};
use super::planner::{self, Wave};
use super::run::{
    AbortReason, DeploymentRun, ObservationKind, ObservationLog, Sealed, UnitOutcome,
};
use super::unit::DeploymentUnit;
use crate::cancel::CancelToken;
use crate::config::RunConfig;
use crate::gitops::{StatusProbe, SyncTrigger, TriggerMethod};
use crate::types::UnitName;

/// Runs trigger+gate over a validated plan, one wave at a time.
///
/// Co-wave units run as concurrent tasks; a later wave starts only after
/// every unit in the earlier wave has converged. This mirrors the
/// operational requirement that a log-forwarding layer is never brought up
/// against a storage layer that has not been verified healthy.
pub struct SyncOrchestrator {
    trigger: Arc<dyn SyncTrigger>,
    probe: Arc<dyn StatusProbe>,
}

impl SyncOrchestrator {
    pub fn new(trigger: Arc<dyn SyncTrigger>, probe: Arc<dyn StatusProbe>) -> Self {
        Self { trigger, probe }
    }

    pub async fn run(
        &self,
        units: &[DeploymentUnit],
        config: &RunConfig,
        cancel: &CancelToken,
    ) -> DeploymentRun<Sealed> {
        let mut run = DeploymentRun::start();

        let plan = match planner::plan(units) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!("invalid plan: {}", e);
                let unit = e.unit().clone();
                return run.seal_aborted(unit, AbortReason::Configuration(e.to_string()));
            }
        };

        let gate = HealthGate::new(config.timing.timeout, config.timing.poll_interval);

        for wave in plan.waves() {
            if let Some(unit) = first_unit_if_cancelled(wave, cancel) {
                return run.seal_aborted(unit, AbortReason::Cancelled);
            }

            tracing::info!(
                wave = wave.number,
                units = wave.units.len(),
                "processing wave"
            );

            let results = join_all(wave.units.iter().map(|unit| {
                self.run_unit(unit, &gate, config, cancel, run.observations())
            }))
            .await;

            let mut halt: Option<(UnitName, AbortReason)> = None;
            for (name, outcome, gate_result) in results {
                if halt.is_none() {
                    match gate_result {
                        GateResult::Converged => {}
                        GateResult::TimedOut => {
                            halt = Some((name.clone(), AbortReason::Timeout));
                        }
                        GateResult::Cancelled => {
                            halt = Some((name.clone(), AbortReason::Cancelled));
                        }
                    }
                }
                run.record_unit(name, outcome);
            }

            if let Some((unit, reason)) = halt {
                tracing::error!(unit = %unit, "wave {} failed: {}", wave.number, reason);
                return run.seal_aborted(unit, reason);
            }
        }

        run.seal_success()
    }

    /// Trigger one unit (unless dry-running) and wait for convergence.
    async fn run_unit(
        &self,
        unit: &DeploymentUnit,
        gate: &HealthGate,
        config: &RunConfig,
        cancel: &CancelToken,
        log: &ObservationLog,
    ) -> (UnitName, UnitOutcome, GateResult) {
        let mut trigger_method: Option<TriggerMethod> = None;
        let mut trigger_error: Option<String> = None;

        if config.dry_run {
            tracing::info!(unit = %unit.name, "dry run: skipping sync trigger");
        } else {
            match self.trigger.trigger(&unit.name).await {
                Ok(ack) => trigger_method = Some(ack.method),
                Err(e) => {
                    // Not fatal by itself: the unit may already be
                    // converging from a prior external change.
                    log.record(
                        &unit.name,
                        ObservationKind::TriggerFailure,
                        format!("trigger for {} failed: {e}", unit.name),
                    );
                    trigger_error = Some(e.to_string());
                }
            }
        }

        let gated = gate.wait(self.probe.as_ref(), &unit.name, cancel, log).await;

        let error = match gated.result {
            GateResult::Converged => trigger_error,
            GateResult::TimedOut => Some(format!(
                "did not converge within deadline (last: sync={}, health={})",
                gated.last_status.sync, gated.last_status.health
            )),
            GateResult::Cancelled => Some("run cancelled".to_string()),
        };

        let outcome = UnitOutcome {
            final_sync_state: gated.last_status.sync,
            final_health_state: gated.last_status.health,
            attempts: gated.attempts,
            trigger_method,
            degraded_observations: gated.degraded_polls,
            error,
        };

        (unit.name.clone(), outcome, gated.result)
    }
}

fn first_unit_if_cancelled(wave: &Wave, cancel: &CancelToken) -> Option<UnitName> {
    if cancel.is_cancelled() {
        wave.units.first().map(|u| u.name.clone())
    } else {
        None
    }
}
