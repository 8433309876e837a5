// ABOUTME: Sync trigger command implementation.
// ABOUTME: Locks the environment, runs the orchestrator, reports the run.

use std::env;
use std::time::Duration;

use super::{build_orchestrator, run_and_report};
use crate::config::{Config, RunConfig, UnitDecl};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::output::Output;
use crate::plan::{DeploymentUnit, RunLock};
use crate::types::EnvName;

/// Flags recognized by the sync-trigger entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Suppress all trigger side effects; probes still run against real state.
    pub dry_run: bool,
    /// Override the default per-unit timeout.
    pub timeout: Option<Duration>,
    /// Override the default poll interval.
    pub poll_interval: Option<Duration>,
    /// Break a live run lock.
    pub force: bool,
}

/// Trigger and gate synchronization of an environment's registered units.
pub async fn trigger(environment: &str, options: SyncOptions, mut output: Output) -> Result<()> {
    let env_name =
        EnvName::new(environment).map_err(|e| Error::InvalidConfig(e.to_string()))?;

    let cwd = env::current_dir()?;
    let config = Config::discover(&cwd)?.for_environment(environment)?;

    let run_config = RunConfig {
        environment: env_name.clone(),
        dry_run: options.dry_run,
        timing: config.timing.resolve(options.timeout, options.poll_interval),
    };

    let units: Vec<DeploymentUnit> = config.applications.iter().map(UnitDecl::to_unit).collect();

    output.start_timer();
    output.progress(&format!(
        "Syncing {} unit(s) for {}{}",
        units.len(),
        environment,
        if options.dry_run { " (dry run)" } else { "" }
    ));

    let lock = RunLock::acquire(&env_name, options.force)?;

    let orchestrator = match build_orchestrator(&config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            let _ = lock.release();
            return Err(e);
        }
    };

    let mut diag = Diagnostics::default();
    let result = run_and_report(&orchestrator, &units, &run_config, &output, &mut diag).await;

    if let Err(e) = lock.release() {
        let message = format!("failed to release run lock: {e}");
        output.warning(&message);
        diag.warn(Warning::lock_release(message));
    }

    result?;
    output.success("Sync complete");
    Ok(())
}
