// ABOUTME: Runner for operator-supplied provisioning scripts.
// ABOUTME: Cloud resource creation stays outside the orchestrator's scope.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::types::EnvName;

/// Context passed to provisioning scripts via environment variables.
#[derive(Debug, Clone)]
pub struct ProvisionContext {
    pub environment: EnvName,
    pub region: String,
}

impl ProvisionContext {
    /// Convert context to environment variables.
    pub fn to_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert(
            "KYMATA_ENVIRONMENT".to_string(),
            self.environment.to_string(),
        );
        env.insert("KYMATA_REGION".to_string(), self.region.clone());
        env
    }
}

/// Result of running a provisioning script.
#[derive(Debug)]
pub struct ProvisionResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Discovers and runs provisioning scripts from a project directory.
pub struct ProvisionRunner {
    scripts_dir: PathBuf,
}

impl ProvisionRunner {
    /// Create a runner looking for scripts under `.kymata/provision/`.
    pub fn new(project_dir: &Path) -> Self {
        Self {
            scripts_dir: project_dir.join(".kymata").join("provision"),
        }
    }

    /// Check if a script exists for the given name.
    pub fn script_exists(&self, name: &str) -> bool {
        self.script_path(name).is_file()
    }

    /// Path to a script, for error messages.
    pub fn script_path(&self, name: &str) -> PathBuf {
        self.scripts_dir.join(name)
    }

    /// Run a script if it exists.
    ///
    /// Returns None if the script doesn't exist, or Some(result) if it ran.
    pub async fn run(&self, name: &str, context: &ProvisionContext) -> Option<ProvisionResult> {
        let script_path = self.script_path(name);

        if !script_path.is_file() {
            return None;
        }

        tracing::info!("Running provisioning script: {}", script_path.display());

        let env_vars = context.to_env();

        let output = Command::new(&script_path)
            .envs(&env_vars)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) => {
                let result = ProvisionResult {
                    success: output.status.success(),
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if result.success {
                    tracing::info!("{} script completed successfully", name);
                } else {
                    tracing::warn!(
                        "{} script failed with exit code {:?}",
                        name,
                        result.exit_code
                    );
                }

                Some(result)
            }
            Err(e) => {
                tracing::error!("Failed to execute {} script: {}", name, e);
                Some(ProvisionResult {
                    success: false,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                })
            }
        }
    }
}
