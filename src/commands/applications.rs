// ABOUTME: Applications register command implementation.
// ABOUTME: Upserts an environment's declared units into the reconciliation API.

use std::env;

use super::operators::register_decl;
use crate::config::Config;
use crate::error::Result;
use crate::gitops::ArgoApi;
use crate::output::Output;

/// Register the declarative units for an environment.
///
/// Registration only makes the units known to the reconciliation system;
/// ordering and convergence are `sync trigger`'s concern.
pub async fn register(environment: &str, mut output: Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let config = Config::discover(&cwd)?.for_environment(environment)?;

    output.start_timer();
    output.progress(&format!(
        "Registering {} application(s) for {}",
        config.applications.len(),
        environment
    ));

    let api = ArgoApi::new(&config.server, config.resolve_token()?)?;
    for decl in config.applications.iter() {
        register_decl(&api, &config, decl).await?;
        output.progress(&format!("  → registered {} (wave {})", decl.name, decl.wave));
    }

    output.success(&format!(
        "Registered {} application(s)",
        config.applications.len()
    ));
    Ok(())
}
