// ABOUTME: The stateful record of one orchestration invocation.
// ABOUTME: Typestate markers make a sealed run immutable at compile time.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::gitops::{HealthState, SyncState, TriggerMethod};
use crate::types::UnitName;

/// Marker: the run is accumulating outcomes.
/// Available actions: `record_unit()`, `seal_success()`, `seal_aborted()`
#[derive(Debug, Clone, Copy, Default)]
pub struct InFlight;

/// Marker: the run is sealed and immutable.
/// Available actions: accessors only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sealed;

/// Final state of one unit after its trigger+gate sequence.
#[derive(Debug, Clone, Serialize)]
pub struct UnitOutcome {
    pub final_sync_state: SyncState,
    pub final_health_state: HealthState,
    pub attempts: u32,
    pub trigger_method: Option<TriggerMethod>,
    pub degraded_observations: u32,
    pub error: Option<String>,
}

/// Why a run was sealed as aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    Configuration(String),
    Timeout,
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Configuration(msg) => write!(f, "configuration: {msg}"),
            AbortReason::Timeout => write!(f, "timeout"),
            AbortReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Success,
    Aborted { unit: UnitName, reason: AbortReason },
}

/// A non-fatal observation made while a run was in flight.
#[derive(Debug, Clone)]
pub struct Observation {
    pub unit: UnitName,
    pub kind: ObservationKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationKind {
    /// A unit reported `Degraded` health; tolerated until the deadline.
    DegradedHealth,
    /// A status probe failed; the poll loop continues.
    ProbeFailure,
    /// Both trigger mechanisms failed; convergence is still awaited.
    TriggerFailure,
}

/// Shared log for observations from concurrent co-wave tasks.
///
/// Outcome storage is keyed by unit name and written by exactly one task
/// per key; this log is the only cross-task shared write.
#[derive(Debug, Default)]
pub struct ObservationLog {
    entries: Mutex<Vec<Observation>>,
}

impl ObservationLog {
    pub fn record(&self, unit: &UnitName, kind: ObservationKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(unit = %unit, "{}", message);
        self.entries.lock().push(Observation {
            unit: unit.clone(),
            kind,
            message,
        });
    }

    pub fn entries(&self) -> Vec<Observation> {
        self.entries.lock().clone()
    }
}

/// One execution of the orchestrator, parameterized by its lifecycle state.
///
/// Exclusively owned by the invocation that created it; under concurrent
/// co-wave polling, per-unit tasks only touch the observation log.
#[derive(Debug)]
pub struct DeploymentRun<S> {
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    outcomes: HashMap<UnitName, UnitOutcome>,
    outcome: Option<RunOutcome>,
    observations: ObservationLog,
    _state: PhantomData<S>,
}

impl DeploymentRun<InFlight> {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            outcomes: HashMap::new(),
            outcome: None,
            observations: ObservationLog::default(),
            _state: PhantomData,
        }
    }

    /// Record the final state of one unit. Each unit is recorded once.
    pub fn record_unit(&mut self, unit: UnitName, outcome: UnitOutcome) {
        self.outcomes.insert(unit, outcome);
    }

    pub fn seal_success(self) -> DeploymentRun<Sealed> {
        self.seal(RunOutcome::Success)
    }

    pub fn seal_aborted(self, unit: UnitName, reason: AbortReason) -> DeploymentRun<Sealed> {
        self.seal(RunOutcome::Aborted { unit, reason })
    }

    fn seal(self, outcome: RunOutcome) -> DeploymentRun<Sealed> {
        DeploymentRun {
            started_at: self.started_at,
            finished_at: Some(Utc::now()),
            outcomes: self.outcomes,
            outcome: Some(outcome),
            observations: self.observations,
            _state: PhantomData,
        }
    }
}

impl<S> DeploymentRun<S> {
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn unit_outcomes(&self) -> &HashMap<UnitName, UnitOutcome> {
        &self.outcomes
    }

    pub fn observations(&self) -> &ObservationLog {
        &self.observations
    }
}

impl DeploymentRun<Sealed> {
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at.expect("sealed run must have finish time")
    }

    pub fn outcome(&self) -> &RunOutcome {
        self.outcome.as_ref().expect("sealed run must have outcome")
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome(), RunOutcome::Success)
    }
}
