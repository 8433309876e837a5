// ABOUTME: Test support utilities.
// ABOUTME: Scripted probe and recording trigger doubles plus a shared event journal.

// Each test binary only uses some of these helpers.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use kymata::gitops::{
    HealthState, ProbeError, StatusProbe, SyncState, SyncTrigger, TriggerAck, TriggerError,
    TriggerMethod, UnitStatus,
};
use kymata::plan::DeploymentUnit;
use kymata::types::UnitName;

pub fn name(s: &str) -> UnitName {
    UnitName::new(s).unwrap()
}

pub fn unit(n: &str, wave: u32) -> DeploymentUnit {
    DeploymentUnit::new(name(n), wave)
}

pub fn status(sync: SyncState, health: HealthState) -> UnitStatus {
    UnitStatus { sync, health }
}

pub fn converged() -> UnitStatus {
    status(SyncState::Synced, HealthState::Healthy)
}

/// What the stubs saw, in observation order across all units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Triggered(UnitName),
    Converged(UnitName),
}

/// Shared journal written by both stub implementations, so tests can assert
/// cross-unit ordering.
#[derive(Default)]
pub struct Journal {
    events: Mutex<Vec<Event>>,
}

impl Journal {
    pub fn record(&self, event: Event) {
        self.events.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn trigger_count(&self, unit: &UnitName) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Triggered(n) if n == unit))
            .count()
    }

    pub fn total_triggers(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Triggered(_)))
            .count()
    }

    /// Index of the first occurrence of an event, if any.
    pub fn first_index(&self, event: &Event) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }
}

/// Probe replaying a scripted status sequence per unit. The last scripted
/// status is held once the script is exhausted; unscripted units report the
/// default status (missing, unless overridden).
pub struct ScriptedProbe {
    journal: Arc<Journal>,
    scripts: Mutex<HashMap<UnitName, VecDeque<UnitStatus>>>,
    default: UnitStatus,
    calls: Mutex<Vec<UnitName>>,
}

impl ScriptedProbe {
    pub fn new(journal: Arc<Journal>) -> Self {
        Self {
            journal,
            scripts: Mutex::new(HashMap::new()),
            default: UnitStatus::missing(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn script(self, unit: &str, statuses: Vec<UnitStatus>) -> Self {
        self.scripts.lock().insert(name(unit), statuses.into());
        self
    }

    /// Default status for units without a script.
    pub fn always(mut self, status: UnitStatus) -> Self {
        self.default = status;
        self
    }

    pub fn probe_count(&self, unit: &str) -> usize {
        let unit = name(unit);
        self.calls.lock().iter().filter(|n| **n == unit).count()
    }

    pub fn total_probes(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl StatusProbe for ScriptedProbe {
    async fn probe(&self, unit: &UnitName) -> Result<UnitStatus, ProbeError> {
        self.calls.lock().push(unit.clone());

        let status = {
            let mut scripts = self.scripts.lock();
            match scripts.get_mut(unit) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(self.default),
                Some(queue) => queue.front().copied().unwrap_or(self.default),
                None => self.default,
            }
        };

        if status.converged() {
            self.journal.record(Event::Converged(unit.clone()));
        }
        Ok(status)
    }
}

/// What a recording trigger should answer with.
#[derive(Debug, Clone, Copy)]
pub enum TriggerBehavior {
    Succeed(TriggerMethod),
    Fail,
}

/// Trigger that records every call in the journal and answers per its
/// configured behavior.
pub struct RecordingTrigger {
    journal: Arc<Journal>,
    behavior: TriggerBehavior,
}

impl RecordingTrigger {
    pub fn succeeding(journal: Arc<Journal>) -> Self {
        Self::with_behavior(journal, TriggerBehavior::Succeed(TriggerMethod::Client))
    }

    pub fn with_method(journal: Arc<Journal>, method: TriggerMethod) -> Self {
        Self::with_behavior(journal, TriggerBehavior::Succeed(method))
    }

    pub fn failing(journal: Arc<Journal>) -> Self {
        Self::with_behavior(journal, TriggerBehavior::Fail)
    }

    fn with_behavior(journal: Arc<Journal>, behavior: TriggerBehavior) -> Self {
        Self { journal, behavior }
    }
}

#[async_trait]
impl SyncTrigger for RecordingTrigger {
    async fn trigger(&self, unit: &UnitName) -> Result<TriggerAck, TriggerError> {
        self.journal.record(Event::Triggered(unit.clone()));
        match self.behavior {
            TriggerBehavior::Succeed(method) => Ok(TriggerAck { method }),
            TriggerBehavior::Fail => Err(TriggerError::Unreachable("stub offline".to_string())),
        }
    }
}
