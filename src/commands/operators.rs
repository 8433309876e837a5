// ABOUTME: Operators setup command implementation.
// ABOUTME: Registers and converges the wave-0 operator-installation units.

use std::env;
use std::time::Duration;

use super::{build_orchestrator, run_and_report};
use crate::config::{Config, RunConfig, UnitDecl};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::gitops::{AppManifest, ArgoApi};
use crate::output::Output;
use crate::plan::DeploymentUnit;
use crate::types::EnvName;

#[derive(Debug, Clone, Copy, Default)]
pub struct SetupOptions {
    pub timeout: Option<Duration>,
    pub poll_interval: Option<Duration>,
}

/// Register the operator-installation units and converge them.
///
/// Operators are environment-independent: they come from the base manifest
/// without environment overrides.
pub async fn setup(options: SetupOptions, mut output: Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let config = Config::discover(&cwd)?;

    if config.operators.is_empty() {
        return Err(Error::NoOperators);
    }

    output.start_timer();
    output.progress(&format!(
        "Setting up {} operator unit(s)",
        config.operators.len()
    ));

    let api = ArgoApi::new(&config.server, config.resolve_token()?)?;
    for decl in &config.operators {
        register_decl(&api, &config, decl).await?;
        output.progress(&format!("  → registered {} (wave {})", decl.name, decl.wave));
    }

    let run_config = RunConfig {
        environment: EnvName::new("operators").expect("static name is valid"),
        dry_run: false,
        timing: config.timing.resolve(options.timeout, options.poll_interval),
    };
    let units: Vec<DeploymentUnit> = config.operators.iter().map(UnitDecl::to_unit).collect();

    let orchestrator = build_orchestrator(&config)?;
    let mut diag = Diagnostics::default();
    run_and_report(&orchestrator, &units, &run_config, &output, &mut diag).await?;

    output.success("Operators ready");
    Ok(())
}

pub(super) async fn register_decl(api: &ArgoApi, config: &Config, decl: &UnitDecl) -> Result<()> {
    let manifest = AppManifest {
        name: &decl.name,
        project: &config.project,
        repo_url: &config.repo.url,
        revision: &config.repo.revision,
        path: decl.source_path(),
        dest_server: &config.destination.server,
        namespace: decl
            .namespace
            .as_deref()
            .unwrap_or(&config.destination.namespace),
        wave: decl.wave,
    };

    api.upsert_application(&manifest.to_json()).await?;
    Ok(())
}
