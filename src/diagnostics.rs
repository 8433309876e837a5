// ABOUTME: Diagnostics accumulator for non-fatal warnings during a run.
// ABOUTME: Collects warnings that shouldn't fail a run but should be shown to users.

/// Collects non-fatal warnings during orchestration commands.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A unit reported degraded health during polling.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::DegradedHealth,
            message: message.into(),
        }
    }

    /// A status probe failed mid-poll.
    pub fn probe_failure(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ProbeFailure,
            message: message.into(),
        }
    }

    /// A sync trigger failed; the gate still awaited convergence.
    pub fn trigger_failure(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::TriggerFailure,
            message: message.into(),
        }
    }

    /// Failed to release the run lock.
    pub fn lock_release(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LockRelease,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A unit spent part of the run in degraded health.
    DegradedHealth,
    /// A status probe failed (tolerated until the deadline).
    ProbeFailure,
    /// A sync trigger failed (convergence still awaited).
    TriggerFailure,
    /// Failed to remove the run lock file.
    LockRelease,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::degraded("storage degraded"));
        diag.warn(Warning::lock_release("failed to remove lock file"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
        assert_eq!(diag.warnings()[0].kind, WarningKind::DegradedHealth);
    }
}
