// ABOUTME: Error types for trigger and probe operations against the API.
// ABOUTME: Trigger failures are non-fatal to a run; the health gate decides.

use thiserror::Error;

/// Failure to get a sync request accepted.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// The API rejected the request.
    #[error("sync request rejected: {status} {message}")]
    Rejected { status: u16, message: String },

    /// The API could not be reached.
    #[error("reconciliation API unreachable: {0}")]
    Unreachable(String),

    /// Primary and fallback mechanisms both failed. Recorded in the run,
    /// but convergence is still awaited: the unit may already be converging
    /// from a prior external change.
    #[error("primary trigger failed ({primary}); fallback failed ({fallback})")]
    AllMethodsFailed { primary: String, fallback: String },
}

/// Failure to read a unit's status.
///
/// A missing unit is not an error (the probe reports
/// `{Unregistered, Unknown}` for it); these are transport-level failures.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("reconciliation API unreachable: {0}")]
    Unreachable(String),

    #[error("status read rejected: {status} {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed status response: {0}")]
    Decode(String),
}
