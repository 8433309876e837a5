// ABOUTME: Integration tests for the health gate polling loop.
// ABOUTME: Covers immediate convergence, degraded tolerance, timeout, and cancellation.

mod support;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kymata::cancel::cancel_pair;
use kymata::gitops::{HealthState, ProbeError, StatusProbe, SyncState, UnitStatus};
use kymata::plan::{GateResult, HealthGate, ObservationKind, ObservationLog};
use kymata::types::UnitName;

use support::{converged, name, status, Journal, ScriptedProbe};

fn gate(timeout_secs: u64, poll_secs: u64) -> HealthGate {
    HealthGate::new(
        Duration::from_secs(timeout_secs),
        Duration::from_secs(poll_secs),
    )
}

#[tokio::test(start_paused = true)]
async fn immediate_convergence_needs_no_sleep() {
    let journal = Arc::new(Journal::default());
    let probe = ScriptedProbe::new(journal).script("storage", vec![converged()]);
    let (_handle, cancel) = cancel_pair();
    let log = ObservationLog::default();

    let before = tokio::time::Instant::now();
    let outcome = gate(300, 15)
        .wait(&probe, &name("storage"), &cancel, &log)
        .await;

    assert_eq!(outcome.result, GateResult::Converged);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(probe.probe_count("storage"), 1);
    // Zero sleeps: paused time must not have advanced.
    assert_eq!(before.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn degraded_is_tolerated_until_convergence() {
    let journal = Arc::new(Journal::default());
    let probe = ScriptedProbe::new(journal).script(
        "storage",
        vec![
            status(SyncState::Synced, HealthState::Degraded),
            status(SyncState::Synced, HealthState::Degraded),
            converged(),
        ],
    );
    let (_handle, cancel) = cancel_pair();
    let log = ObservationLog::default();

    let outcome = gate(300, 5)
        .wait(&probe, &name("storage"), &cancel, &log)
        .await;

    assert_eq!(outcome.result, GateResult::Converged);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.degraded_polls, 2);

    let entries = log.entries();
    assert_eq!(entries.len(), 1, "one observation per degraded episode");
    assert_eq!(entries[0].kind, ObservationKind::DegradedHealth);
}

#[tokio::test(start_paused = true)]
async fn deadline_expiry_returns_timed_out() {
    let journal = Arc::new(Journal::default());
    let probe = ScriptedProbe::new(journal)
        .always(status(SyncState::Syncing, HealthState::Progressing));
    let (_handle, cancel) = cancel_pair();
    let log = ObservationLog::default();

    let outcome = gate(30, 5)
        .wait(&probe, &name("storage"), &cancel, &log)
        .await;

    assert_eq!(outcome.result, GateResult::TimedOut);
    assert_eq!(outcome.attempts, 6);
    assert_eq!(outcome.last_status.sync, SyncState::Syncing);
    assert_eq!(outcome.last_status.health, HealthState::Progressing);
}

#[tokio::test(start_paused = true)]
async fn synced_alone_is_not_convergence() {
    let journal = Arc::new(Journal::default());
    let probe = ScriptedProbe::new(journal)
        .always(status(SyncState::Synced, HealthState::Progressing));
    let (_handle, cancel) = cancel_pair();
    let log = ObservationLog::default();

    let outcome = gate(20, 5)
        .wait(&probe, &name("storage"), &cancel, &log)
        .await;

    assert_eq!(outcome.result, GateResult::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn healthy_but_out_of_sync_is_not_convergence() {
    let journal = Arc::new(Journal::default());
    let probe = ScriptedProbe::new(journal)
        .always(status(SyncState::OutOfSync, HealthState::Healthy));
    let (_handle, cancel) = cancel_pair();
    let log = ObservationLog::default();

    let outcome = gate(20, 5)
        .wait(&probe, &name("storage"), &cancel, &log)
        .await;

    assert_eq!(outcome.result, GateResult::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_mid_poll() {
    let journal = Arc::new(Journal::default());
    let probe = ScriptedProbe::new(journal)
        .always(status(SyncState::Syncing, HealthState::Progressing));
    let (handle, cancel) = cancel_pair();
    let log = ObservationLog::default();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(7)).await;
        handle.cancel();
    });

    let before = tokio::time::Instant::now();
    let outcome = gate(600, 5)
        .wait(&probe, &name("storage"), &cancel, &log)
        .await;

    assert_eq!(outcome.result, GateResult::Cancelled);
    // Interrupted during the second sleep, long before the deadline.
    assert!(before.elapsed() < Duration::from_secs(10));
}

struct BrokenProbe;

#[async_trait]
impl StatusProbe for BrokenProbe {
    async fn probe(&self, _unit: &UnitName) -> Result<UnitStatus, ProbeError> {
        Err(ProbeError::Unreachable("connection refused".to_string()))
    }
}

#[tokio::test(start_paused = true)]
async fn probe_failures_are_tolerated_until_deadline() {
    let (_handle, cancel) = cancel_pair();
    let log = ObservationLog::default();

    let outcome = gate(15, 5)
        .wait(&BrokenProbe, &name("storage"), &cancel, &log)
        .await;

    assert_eq!(outcome.result, GateResult::TimedOut);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.last_status, UnitStatus::missing());

    let entries = log.entries();
    assert_eq!(entries.len(), 3);
    assert!(entries
        .iter()
        .all(|o| o.kind == ObservationKind::ProbeFailure));
}
