// ABOUTME: Bounded polling until a unit converges, times out, or is cancelled.
// ABOUTME: Degraded health and probe failures are tolerated until the deadline.

use std::time::Duration;

use tokio::time::Instant;

use super::run::{ObservationKind, ObservationLog};
use crate::cancel::CancelToken;
use crate::gitops::{HealthState, StatusProbe, UnitStatus};
use crate::types::UnitName;

/// How a gate wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateResult {
    /// The unit reached `{Synced, Healthy}`.
    Converged,
    /// The deadline expired without convergence.
    TimedOut,
    /// Run-level cancellation was observed at a poll tick.
    Cancelled,
}

/// What the gate observed, for the unit's run record.
#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub result: GateResult,
    pub attempts: u32,
    pub last_status: UnitStatus,
    pub degraded_polls: u32,
}

/// Blocks until a unit converges, a deadline expires, or the run is
/// cancelled.
///
/// Polling is used instead of event subscription: the external system's
/// change-notification channel is not assumed reliable across deployment
/// targets. Convergence requires sync and health to agree; a unit can be
/// `Synced` while its workload is still `Progressing`, and `Healthy` under
/// a stale manifest.
#[derive(Debug, Clone, Copy)]
pub struct HealthGate {
    timeout: Duration,
    poll_interval: Duration,
}

impl HealthGate {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Poll until convergence or the deadline.
    ///
    /// An already-converged unit returns `Converged` on the first probe
    /// with zero sleeps, which is what makes run re-entry a no-op for
    /// units that converged in an earlier run.
    pub async fn wait<P: StatusProbe + ?Sized>(
        &self,
        probe: &P,
        unit: &UnitName,
        cancel: &CancelToken,
        log: &ObservationLog,
    ) -> GateOutcome {
        let start = Instant::now();
        let mut attempts = 0u32;
        let mut degraded_polls = 0u32;
        let mut last_status = UnitStatus::missing();

        while start.elapsed() < self.timeout {
            if cancel.is_cancelled() {
                return GateOutcome {
                    result: GateResult::Cancelled,
                    attempts,
                    last_status,
                    degraded_polls,
                };
            }

            attempts += 1;
            match probe.probe(unit).await {
                Ok(status) => {
                    last_status = status;
                    if status.converged() {
                        tracing::info!(unit = %unit, attempts, "converged");
                        return GateOutcome {
                            result: GateResult::Converged,
                            attempts,
                            last_status,
                            degraded_polls,
                        };
                    }
                    if status.health == HealthState::Degraded {
                        degraded_polls += 1;
                        // Degradation during initial rollout is expected;
                        // only the deadline turns it into a failure.
                        if degraded_polls == 1 {
                            log.record(
                                unit,
                                ObservationKind::DegradedHealth,
                                format!("{unit} reported degraded health, continuing to poll"),
                            );
                        }
                    }
                    tracing::debug!(
                        unit = %unit,
                        sync = %status.sync,
                        health = %status.health,
                        attempts,
                        "not converged yet"
                    );
                }
                Err(e) => {
                    log.record(
                        unit,
                        ObservationKind::ProbeFailure,
                        format!("status probe for {unit} failed: {e}"),
                    );
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    return GateOutcome {
                        result: GateResult::Cancelled,
                        attempts,
                        last_status,
                        degraded_polls,
                    };
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        GateOutcome {
            result: GateResult::TimedOut,
            attempts,
            last_status,
            degraded_polls,
        }
    }
}
