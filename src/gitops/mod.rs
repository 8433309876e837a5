// ABOUTME: Interface to the external reconciliation system.
// ABOUTME: Capability traits plus the API-backed trigger, probe, and fallback.

mod argocd;
mod chain;
mod client;
mod error;
mod manifest;
mod patch;
mod traits;
mod types;

pub use argocd::{ApiProbe, ApiTrigger};
pub use chain::FallbackTrigger;
pub use client::{ApiError, ApiErrorKind, Application, ArgoApi};
pub use error::{ProbeError, TriggerError};
pub use manifest::AppManifest;
pub use patch::PatchTrigger;
pub use traits::{StatusProbe, SyncTrigger};
pub use types::{HealthState, SyncState, TriggerAck, TriggerMethod, UnitStatus};
