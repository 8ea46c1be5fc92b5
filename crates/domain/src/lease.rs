use serde::{Deserialize, Serialize};
use weighbridge_core::LockError;
pub use weighbridge_core::UNKNOWN_HOLDER;

/// Lifecycle phase of the periodic lease renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartbeatPhase {
    /// No renewal task is armed.
    Idle,
    /// A renewal task is armed.
    Running,
    /// Renewal was suspended without releasing the lease.
    Paused,
}

/// Read model of one client-side lease, as shown to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseSnapshot {
    /// True iff this client believes it currently holds the exclusive lease.
    pub has_lock: bool,
    /// Competing holder observed on the last conflict, if any.
    pub holder: Option<String>,
    /// True while renewal is intentionally suspended.
    pub paused: bool,
    /// Current renewal phase.
    pub heartbeat: HeartbeatPhase,
}

/// Acknowledgement of a lock call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAck {
    /// The service accepted the call.
    Applied,
    /// The identifier was not well formed, so nothing was sent.
    Skipped,
}

/// Result of a best-effort release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The service confirmed the release.
    Released,
    /// The release was handed to a fire-and-forget delivery.
    Dispatched,
    /// Nothing was sent.
    Skipped,
    /// The release failed and was logged.
    Failed,
}

/// Classified result of a quiet heartbeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    /// The lease was renewed.
    Renewed,
    /// The identifier was not well formed, so nothing was sent.
    Skipped,
    /// The lease is gone: taken over, expired, or credentials rejected.
    LeaseLost(LockError),
    /// Transient failure; the next tick tries again.
    Retryable(LockError),
}

impl HeartbeatOutcome {
    /// Classifies a heartbeat call result.
    #[must_use]
    pub fn from_result(result: Result<LockAck, LockError>) -> Self {
        match result {
            Ok(LockAck::Applied) => Self::Renewed,
            Ok(LockAck::Skipped) => Self::Skipped,
            Err(error) if error.revokes_lease() => Self::LeaseLost(error),
            Err(error) => Self::Retryable(error),
        }
    }
}
