// ABOUTME: Sync and health state enums observed from the reconciliation system.
// ABOUTME: Convergence means the combined state {Synced, Healthy}.

use serde::Serialize;
use std::fmt;

/// Synchronization state of a deployment unit.
///
/// `Synced` can regress to `Syncing` or `OutOfSync` when the external
/// system detects drift; the orchestrator observes that, it never causes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncState {
    /// The unit does not exist in the reconciliation system yet.
    Unregistered,
    /// The unit exists but has not been reconciled.
    Registered,
    /// Declared state differs from live state.
    OutOfSync,
    /// A sync operation is in progress.
    Syncing,
    /// Declared state has been applied.
    Synced,
    /// The last sync operation failed.
    SyncFailed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncState::Unregistered => "unregistered",
            SyncState::Registered => "registered",
            SyncState::OutOfSync => "out-of-sync",
            SyncState::Syncing => "syncing",
            SyncState::Synced => "synced",
            SyncState::SyncFailed => "sync-failed",
        };
        write!(f, "{s}")
    }
}

/// Health state of a deployment unit.
///
/// `Degraded` is not terminal: it may self-resolve into `Healthy` before a
/// deadline, and only counts as failure once the deadline expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthState {
    Unknown,
    Progressing,
    Degraded,
    Healthy,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealthState::Unknown => "unknown",
            HealthState::Progressing => "progressing",
            HealthState::Degraded => "degraded",
            HealthState::Healthy => "healthy",
        };
        write!(f, "{s}")
    }
}

/// Combined sync/health observation for one unit at one poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnitStatus {
    pub sync: SyncState,
    pub health: HealthState,
}

impl UnitStatus {
    /// Status reported for a unit the reconciliation system does not know
    /// about yet. A legitimate transient state early in a run.
    pub fn missing() -> Self {
        Self {
            sync: SyncState::Unregistered,
            health: HealthState::Unknown,
        }
    }

    /// Both halves agree: the manifest is applied and the workload is ready.
    /// Neither half alone is a safe signal to unblock a dependent unit.
    pub fn converged(&self) -> bool {
        self.sync == SyncState::Synced && self.health == HealthState::Healthy
    }
}

/// Which trigger mechanism got a sync request accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriggerMethod {
    /// Direct sync request through the API client.
    Client,
    /// Declarative patch requests (hard refresh + automated self-heal).
    Patch,
}

impl fmt::Display for TriggerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TriggerMethod::Client => "client",
            TriggerMethod::Patch => "patch",
        };
        write!(f, "{s}")
    }
}

/// Acknowledgement that a sync request was accepted (not that
/// reconciliation completed).
#[derive(Debug, Clone, Copy)]
pub struct TriggerAck {
    pub method: TriggerMethod,
}
