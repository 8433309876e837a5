// ABOUTME: Capability traits for the external reconciliation system.
// ABOUTME: Trigger requests a sync; probe reads combined sync/health state.

use super::error::{ProbeError, TriggerError};
use super::types::{TriggerAck, UnitStatus};
use crate::types::UnitName;
use async_trait::async_trait;

/// Asks the reconciliation system to reconcile one unit's declared state
/// against its live state. Success means the request was accepted.
#[async_trait]
pub trait SyncTrigger: Send + Sync {
    async fn trigger(&self, unit: &UnitName) -> Result<TriggerAck, TriggerError>;
}

/// Reads the current sync/health pair for a unit. Read-only; results must
/// never be cached longer than one polling tick.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn probe(&self, unit: &UnitName) -> Result<UnitStatus, ProbeError>;
}
