//! Client-side lease over one process lock.
//!
//! `ProcessLease` keeps this client's belief about the remote lease for one
//! process identifier. The belief only becomes "held" after the lock service
//! acknowledges an acquire or a heartbeat, and is downgraded whenever a call
//! fails or reports a conflict. No operation returns an error: failures end
//! up as state and logs.
//!
//! Every state-changing operation, including the periodic renewal tick,
//! runs under one async mutex, so a tick never observes a half-applied
//! acquire or release.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, info, warn};
use weighbridge_core::LockError;
use weighbridge_domain::{
    HeartbeatOutcome, LeaseSnapshot, LockAck, ProcessId, ReleaseOutcome, UNKNOWN_HOLDER,
};

use crate::heartbeat_scheduler::HeartbeatScheduler;
use crate::lock_client_config::LockClientConfig;
use crate::lock_gateway::LockGateway;
use crate::lock_ports::{LockDenialNotifier, ReleaseBeacon};

mod guard;
mod slot;
mod teardown;


pub use guard::denial_message;
pub use slot::{LeaseFactory, LeaseSlot};
pub use teardown::LeaseTeardownGuard;

/// Delivery used to release a held lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleasePath {
    /// Authorized request that completes even when the caller goes away.
    #[default]
    KeepAlive,
    /// Non-blocking credential-less delivery for a closing client, when supported.
    Beacon,
}

#[derive(Debug, Default)]
struct LeaseState {
    has_lock: bool,
    holder: Option<String>,
}

struct LeaseInner {
    candidate: String,
    process_id: Option<ProcessId>,
    gateway: LockGateway,
    release_beacon: Option<Arc<dyn ReleaseBeacon>>,
    config: LockClientConfig,
    operations: tokio::sync::Mutex<()>,
    state: Mutex<LeaseState>,
    scheduler: HeartbeatScheduler,
}

impl LeaseInner {
    fn state(&self) -> MutexGuard<'_, LeaseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_held(&self) {
        let mut state = self.state();
        state.has_lock = true;
        state.holder = None;
    }

    fn mark_lost(&self, holder: Option<&str>) {
        let mut state = self.state();
        state.has_lock = false;
        state.holder = Some(holder.unwrap_or(UNKNOWN_HOLDER).to_owned());
    }

    fn clear(&self) {
        let mut state = self.state();
        state.has_lock = false;
        state.holder = None;
    }

    async fn renew_on_tick(&self) -> ControlFlow<()> {
        if self.scheduler.is_paused() || self.process_id.is_none() {
            return ControlFlow::Continue(());
        }

        let _operation = self.operations.lock().await;
        match self.gateway.heartbeat_quietly(&self.candidate).await {
            HeartbeatOutcome::Renewed | HeartbeatOutcome::Skipped => ControlFlow::Continue(()),
            HeartbeatOutcome::LeaseLost(error) => {
                match &error {
                    LockError::Unauthorized(reason) => warn!(
                        process_id = %self.candidate,
                        reason = %reason,
                        "process lease dropped: credentials rejected during heartbeat"
                    ),
                    _ => info!(
                        process_id = %self.candidate,
                        holder = error.holder().unwrap_or(UNKNOWN_HOLDER),
                        "process lease taken over"
                    ),
                }
                self.mark_lost(error.holder());
                ControlFlow::Break(())
            }
            HeartbeatOutcome::Retryable(error) => {
                warn!(
                    process_id = %self.candidate,
                    error = %error,
                    "heartbeat best-effort failed, retrying on next tick"
                );
                ControlFlow::Continue(())
            }
        }
    }

    async fn deliver_release(&self, process_id: &ProcessId, path: ReleasePath) -> ReleaseOutcome {
        if path == ReleasePath::Beacon && self.config.fast_release().allows_beacon() {
            match &self.release_beacon {
                Some(beacon) if beacon.dispatch(process_id) => {
                    return ReleaseOutcome::Dispatched;
                }
                Some(_) => debug!(
                    process_id = %process_id,
                    "release beacon refused, falling back to keep-alive release"
                ),
                None => debug!(
                    process_id = %process_id,
                    "no release beacon wired, falling back to keep-alive release"
                ),
            }
        }

        self.gateway.release(&self.candidate).await
    }
}

/// Exclusive-editing lease of one process, as believed by this client.
///
/// Cloning yields another handle to the same lease.
#[derive(Clone)]
pub struct ProcessLease {
    inner: Arc<LeaseInner>,
}

impl ProcessLease {
    /// Creates an unlocked lease for a candidate identifier.
    ///
    /// An absent or malformed candidate yields a lease whose operations all
    /// no-op.
    #[must_use]
    pub fn new(
        candidate: Option<&str>,
        gateway: LockGateway,
        release_beacon: Option<Arc<dyn ReleaseBeacon>>,
        config: LockClientConfig,
    ) -> Self {
        let candidate = candidate.unwrap_or_default().to_owned();
        let process_id = ProcessId::parse(&candidate);

        Self {
            inner: Arc::new(LeaseInner {
                candidate,
                process_id,
                gateway,
                release_beacon,
                config,
                operations: tokio::sync::Mutex::new(()),
                state: Mutex::new(LeaseState::default()),
                scheduler: HeartbeatScheduler::new(config.heartbeat_interval()),
            }),
        }
    }

    /// Returns the validated identifier, if the candidate was well formed.
    #[must_use]
    pub fn process_id(&self) -> Option<ProcessId> {
        self.inner.process_id
    }

    /// Returns the candidate exactly as supplied.
    #[must_use]
    pub fn candidate(&self) -> &str {
        self.inner.candidate.as_str()
    }

    /// Returns whether this client believes it holds the lease.
    #[must_use]
    pub fn has_lock(&self) -> bool {
        self.inner.state().has_lock
    }

    /// Returns the competing holder observed on the last conflict.
    #[must_use]
    pub fn holder(&self) -> Option<String> {
        self.inner.state().holder.clone()
    }

    /// Returns the UI read model.
    #[must_use]
    pub fn snapshot(&self) -> LeaseSnapshot {
        let (has_lock, holder) = {
            let state = self.inner.state();
            (state.has_lock, state.holder.clone())
        };

        LeaseSnapshot {
            has_lock,
            holder,
            paused: self.inner.scheduler.is_paused(),
            heartbeat: self.inner.scheduler.phase(),
        }
    }

    /// Tries to take the lease.
    ///
    /// On failure the holder is recorded: the name reported by the service,
    /// or a generic description.
    pub async fn acquire(&self) -> bool {
        if self.inner.process_id.is_none() {
            return false;
        }

        let _operation = self.inner.operations.lock().await;
        match self.inner.gateway.acquire(&self.inner.candidate).await {
            Ok(LockAck::Applied) => {
                self.inner.mark_held();
                self.start_heartbeat();
                info!(process_id = %self.inner.candidate, "process lease acquired");
                true
            }
            Ok(LockAck::Skipped) => false,
            Err(error) => {
                self.inner.mark_lost(error.holder());
                false
            }
        }
    }

    /// Leaves the paused phase and re-validates the lease with one heartbeat.
    ///
    /// A failed re-validation keeps any previously observed holder.
    pub async fn resume(&self) -> bool {
        self.inner.scheduler.unpause();
        if self.inner.process_id.is_none() {
            return false;
        }

        let _operation = self.inner.operations.lock().await;
        match self.inner.gateway.heartbeat(&self.inner.candidate).await {
            Ok(LockAck::Applied) => {
                self.inner.mark_held();
                self.start_heartbeat();
                debug!(process_id = %self.inner.candidate, "process lease resumed");
                true
            }
            Ok(LockAck::Skipped) | Err(_) => {
                self.inner.state().has_lock = false;
                false
            }
        }
    }

    /// Suspends renewal without releasing the lease.
    pub fn pause(&self) {
        self.inner.scheduler.pause();
    }

    /// Cancels the renewal task without touching the lease belief.
    pub fn stop_heartbeat(&self) {
        self.inner.scheduler.stop();
    }

    /// Releases the lease, best effort.
    ///
    /// Renewal stops first. Nothing is sent unless this client holds the
    /// lease of a valid process; local state is cleared in every case.
    pub async fn release(&self, path: ReleasePath) -> ReleaseOutcome {
        self.inner.scheduler.stop();

        let _operation = self.inner.operations.lock().await;
        // An acquire or resume that held the lock before us may have re-armed it.
        self.inner.scheduler.stop();
        let held = self.inner.state().has_lock;
        let outcome = match self.inner.process_id {
            Some(process_id) if held => self.inner.deliver_release(&process_id, path).await,
            _ => ReleaseOutcome::Skipped,
        };

        self.inner.clear();
        if outcome != ReleaseOutcome::Skipped {
            info!(process_id = %self.inner.candidate, outcome = ?outcome, "process lease released");
        }

        outcome
    }

    /// Makes sure this client holds the lease before a workflow action.
    ///
    /// Tries, in order: the current belief, a resume, a fresh acquire. When
    /// all fail the operator is told who holds the process.
    pub async fn ensure_lock_or_explain(&self, notifier: &dyn LockDenialNotifier) -> bool {
        guard::ensure_lock_or_explain(self, notifier).await
    }

    fn start_heartbeat(&self) {
        let lease = Arc::downgrade(&self.inner);
        self.inner.scheduler.start(move || renew(Weak::clone(&lease)));
    }
}

async fn renew(lease: Weak<LeaseInner>) -> ControlFlow<()> {
    match lease.upgrade() {
        Some(inner) => inner.renew_on_tick().await,
        None => ControlFlow::Break(()),
    }
}
