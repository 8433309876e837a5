// ABOUTME: Planning and orchestration of wave-ordered synchronization.
// ABOUTME: Exports the planner, health gate, orchestrator, and run record.

mod error;
mod gate;
mod lock;
mod orchestrator;
mod planner;
mod run;
mod unit;

pub use error::ConfigurationError;
pub use gate::{GateOutcome, GateResult, HealthGate};
pub use lock::{LockError, LockInfo, RunLock};
pub use orchestrator::SyncOrchestrator;
pub use planner::{ExecutionPlan, Wave, plan};
pub use run::{
    AbortReason, DeploymentRun, InFlight, Observation, ObservationKind, ObservationLog,
    RunOutcome, Sealed, UnitOutcome,
};
pub use unit::DeploymentUnit;
