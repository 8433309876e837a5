// ABOUTME: Fallback trigger using declarative merge patches.
// ABOUTME: Forces a hard refresh, then enables automated self-healing.

use async_trait::async_trait;

use super::client::{ApiError, ArgoApi};
use super::error::TriggerError;
use super::traits::SyncTrigger;
use super::types::{TriggerAck, TriggerMethod};
use crate::types::UnitName;

/// Fallback trigger for when the direct client path is unavailable.
///
/// Issues two independent patch requests: one forcing a hard refresh, one
/// enabling automated self-healing. A refresh failure does not block the
/// self-heal patch; only both failing is reported as an error, and even
/// then the health gate's timeout stays the authoritative failure signal.
#[derive(Debug, Clone)]
pub struct PatchTrigger {
    api: ArgoApi,
}

impl PatchTrigger {
    pub fn new(api: ArgoApi) -> Self {
        Self { api }
    }
}

fn refresh_patch() -> serde_json::Value {
    serde_json::json!({
        "metadata": {
            "annotations": { "argocd.argoproj.io/refresh": "hard" }
        }
    })
}

fn self_heal_patch() -> serde_json::Value {
    serde_json::json!({
        "spec": {
            "syncPolicy": {
                "automated": { "prune": false, "selfHeal": true }
            }
        }
    })
}

#[async_trait]
impl SyncTrigger for PatchTrigger {
    async fn trigger(&self, unit: &UnitName) -> Result<TriggerAck, TriggerError> {
        let refresh = self.api.patch_application(unit, &refresh_patch()).await;
        if let Err(e) = &refresh {
            tracing::warn!(unit = %unit, "hard refresh patch failed: {}", e);
        }

        let heal = self.api.patch_application(unit, &self_heal_patch()).await;
        if let Err(e) = &heal {
            tracing::warn!(unit = %unit, "self-heal patch failed: {}", e);
        }

        match (refresh, heal) {
            (Err(_), Err(ApiError::Rejected { status, message })) => {
                Err(TriggerError::Rejected { status, message })
            }
            (Err(_), Err(heal_err)) => Err(TriggerError::Unreachable(heal_err.to_string())),
            _ => Ok(TriggerAck {
                method: TriggerMethod::Patch,
            }),
        }
    }
}
