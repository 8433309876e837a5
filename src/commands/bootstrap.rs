// ABOUTME: Bootstrap resources command implementation.
// ABOUTME: Delegates cloud resource creation to an operator-supplied script.

use std::env;

use crate::error::{Error, Result};
use crate::output::Output;
use crate::provision::{ProvisionContext, ProvisionRunner};
use crate::types::EnvName;

const RESOURCES_SCRIPT: &str = "resources";

/// Provision the cloud resources backing an environment's stack.
pub async fn resources(environment: &str, region: &str, mut output: Output) -> Result<()> {
    let env_name =
        EnvName::new(environment).map_err(|e| Error::InvalidConfig(e.to_string()))?;

    let cwd = env::current_dir()?;
    let runner = ProvisionRunner::new(&cwd);
    let context = ProvisionContext {
        environment: env_name,
        region: region.to_string(),
    };

    output.start_timer();
    output.progress(&format!(
        "Provisioning resources for {} in {}",
        environment, region
    ));

    match runner.run(RESOURCES_SCRIPT, &context).await {
        None => Err(Error::Provision(format!(
            "no provisioning script at {}",
            runner.script_path(RESOURCES_SCRIPT).display()
        ))),
        Some(result) if result.success => {
            if !result.stdout.is_empty() {
                output.progress(result.stdout.trim_end());
            }
            output.success("Resources provisioned");
            Ok(())
        }
        Some(result) => {
            if !result.stderr.is_empty() {
                eprintln!("{}", result.stderr.trim_end());
            }
            Err(Error::Provision(format!(
                "provisioning script exited with status {:?}",
                result.exit_code
            )))
        }
    }
}
