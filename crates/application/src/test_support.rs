//! Fakes for the lock ports, shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use weighbridge_core::{LockError, LockResult};
use weighbridge_domain::ProcessId;

use crate::lock_ports::{LockDenialNotifier, LockTransport, ReleaseBeacon};

pub const REFERENCE_PROCESS_ID: &str = "123e4567-e89b-12d3-a456-426614174000";
pub const OTHER_PROCESS_ID: &str = "9b2f6a3e-4c1d-4e8f-9a7b-0c1d2e3f4a5b";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCall {
    Acquire,
    Release,
    Heartbeat,
}

#[derive(Default)]
struct ScriptedFailures {
    acquire: VecDeque<LockError>,
    release: VecDeque<LockError>,
    heartbeat: VecDeque<LockError>,
    every_heartbeat: Option<LockError>,
    every_acquire: Option<LockError>,
}

/// Transport that succeeds unless a failure was scripted, and records every call.
#[derive(Default)]
pub struct ScriptedTransport {
    calls: Mutex<Vec<(TransportCall, ProcessId)>>,
    failures: Mutex<ScriptedFailures>,
    acquire_latency: Mutex<Option<Duration>>,
}

impl ScriptedTransport {
    pub fn fail_next_acquire(&self, error: LockError) {
        self.script(|failures| failures.acquire.push_back(error));
    }

    pub fn fail_every_acquire(&self, error: LockError) {
        self.script(|failures| failures.every_acquire = Some(error));
    }

    pub fn delay_acquire(&self, latency: Duration) {
        *self
            .acquire_latency
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(latency);
    }

    pub fn fail_next_release(&self, error: LockError) {
        self.script(|failures| failures.release.push_back(error));
    }

    pub fn fail_next_heartbeat(&self, error: LockError) {
        self.script(|failures| failures.heartbeat.push_back(error));
    }

    pub fn fail_every_heartbeat(&self, error: LockError) {
        self.script(|failures| failures.every_heartbeat = Some(error));
    }

    pub fn calls(&self) -> Vec<(TransportCall, ProcessId)> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn calls_of(&self, kind: TransportCall) -> usize {
        self.calls()
            .iter()
            .filter(|(call, _)| *call == kind)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls().len()
    }

    fn script(&self, apply: impl FnOnce(&mut ScriptedFailures)) {
        apply(
            &mut self
                .failures
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        );
    }

    fn record(&self, kind: TransportCall, process_id: &ProcessId) -> LockResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((kind, *process_id));

        let mut failures = self
            .failures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let failure = match kind {
            TransportCall::Acquire => failures
                .acquire
                .pop_front()
                .or_else(|| failures.every_acquire.clone()),
            TransportCall::Release => failures.release.pop_front(),
            TransportCall::Heartbeat => failures
                .heartbeat
                .pop_front()
                .or_else(|| failures.every_heartbeat.clone()),
        };

        failure.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl LockTransport for ScriptedTransport {
    async fn acquire(&self, process_id: &ProcessId) -> LockResult<()> {
        let latency = *self
            .acquire_latency
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        self.record(TransportCall::Acquire, process_id)
    }

    async fn release(&self, process_id: &ProcessId) -> LockResult<()> {
        self.record(TransportCall::Release, process_id)
    }

    async fn heartbeat(&self, process_id: &ProcessId) -> LockResult<()> {
        self.record(TransportCall::Heartbeat, process_id)
    }
}

/// Beacon that counts dispatches and can refuse them.
pub struct CountingBeacon {
    dispatched: AtomicUsize,
    accepts: AtomicBool,
}

impl CountingBeacon {
    pub fn accepting() -> Self {
        Self {
            dispatched: AtomicUsize::new(0),
            accepts: AtomicBool::new(true),
        }
    }

    pub fn refusing() -> Self {
        Self {
            dispatched: AtomicUsize::new(0),
            accepts: AtomicBool::new(false),
        }
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }
}

impl ReleaseBeacon for CountingBeacon {
    fn dispatch(&self, _process_id: &ProcessId) -> bool {
        if !self.accepts.load(Ordering::SeqCst) {
            return false;
        }

        self.dispatched.fetch_add(1, Ordering::SeqCst);
        true
    }
}

/// Notifier that keeps every explanation it was asked to show.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl LockDenialNotifier for RecordingNotifier {
    fn explain(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(message.to_owned());
    }
}
