// ABOUTME: Command module aggregator for the kymata CLI.
// ABOUTME: Re-exports operators, bootstrap, applications, and sync handlers.

mod applications;
mod bootstrap;
mod operators;
mod sync;

pub use applications::register;
pub use bootstrap::resources;
pub use operators::{SetupOptions, setup};
pub use sync::{SyncOptions, trigger};

use std::sync::Arc;

use crate::config::{Config, RunConfig, TriggerMode};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::gitops::{
    ApiProbe, ApiTrigger, ArgoApi, FallbackTrigger, PatchTrigger, StatusProbe, SyncTrigger,
};
use crate::output::Output;
use crate::plan::{
    DeploymentRun, DeploymentUnit, ObservationKind, RunOutcome, Sealed, SyncOrchestrator,
};

/// Build the trigger/probe pair from the manifest's server and trigger mode.
fn build_orchestrator(config: &Config) -> Result<SyncOrchestrator> {
    let api = ArgoApi::new(&config.server, config.resolve_token()?)?;

    let probe: Arc<dyn StatusProbe> = Arc::new(ApiProbe::new(api.clone()));
    let trigger: Arc<dyn SyncTrigger> = match config.trigger {
        TriggerMode::Auto => Arc::new(FallbackTrigger::new(
            ApiTrigger::new(api.clone()),
            PatchTrigger::new(api),
        )),
        TriggerMode::Client => Arc::new(ApiTrigger::new(api)),
        TriggerMode::Patch => Arc::new(PatchTrigger::new(api)),
    };

    Ok(SyncOrchestrator::new(trigger, probe))
}

/// Run the orchestrator over a unit set and report the sealed run.
async fn run_and_report(
    orchestrator: &SyncOrchestrator,
    units: &[DeploymentUnit],
    run_config: &RunConfig,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<()> {
    let (cancel_handle, cancel) = crate::cancel::cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, aborting run at next poll tick");
            cancel_handle.cancel();
        }
    });

    let run = orchestrator.run(units, run_config, &cancel).await;
    report_run(&run, output, diag);

    match run.outcome() {
        RunOutcome::Success => Ok(()),
        RunOutcome::Aborted { unit, reason } => Err(Error::Aborted {
            unit: unit.clone(),
            reason: reason.to_string(),
        }),
    }
}

fn report_run(run: &DeploymentRun<Sealed>, output: &Output, diag: &mut Diagnostics) {
    let mut names: Vec<_> = run.unit_outcomes().keys().collect();
    names.sort();

    for name in &names {
        let outcome = &run.unit_outcomes()[*name];
        let trigger = match &outcome.trigger_method {
            Some(method) => method.to_string(),
            None => "-".to_string(),
        };
        output.progress(&format!(
            "  {}: sync={} health={} attempts={} trigger={}",
            name,
            outcome.final_sync_state,
            outcome.final_health_state,
            outcome.attempts,
            trigger
        ));
    }

    for obs in run.observations().entries() {
        let warning = match obs.kind {
            ObservationKind::DegradedHealth => Warning::degraded(obs.message),
            ObservationKind::ProbeFailure => Warning::probe_failure(obs.message),
            ObservationKind::TriggerFailure => Warning::trigger_failure(obs.message),
        };
        diag.warn(warning);
    }

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    let outcome_json = match run.outcome() {
        RunOutcome::Success => serde_json::json!({ "outcome": "success" }),
        RunOutcome::Aborted { unit, reason } => serde_json::json!({
            "outcome": "aborted",
            "unit": unit.as_str(),
            "reason": reason.to_string(),
        }),
    };
    output.emit_json(&serde_json::json!({
        "event": "run",
        "started_at": run.started_at().to_rfc3339(),
        "finished_at": run.finished_at().to_rfc3339(),
        "units": run.unit_outcomes(),
        "run": outcome_json,
    }));
}
