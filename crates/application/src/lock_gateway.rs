use std::sync::Arc;

use tracing::{debug, warn};
use weighbridge_core::{LockError, LockResult};
use weighbridge_domain::{HeartbeatOutcome, LockAck, ProcessId, ReleaseOutcome};

use crate::lock_ports::LockTransport;

/// Lock calls guarded by identifier validation.
///
/// Candidates that are not well-formed process identifiers never reach the
/// transport; the call resolves to a skipped acknowledgement instead.
#[derive(Clone)]
pub struct LockGateway {
    transport: Arc<dyn LockTransport>,
}

impl LockGateway {
    /// Creates a gateway over one transport.
    #[must_use]
    pub fn new(transport: Arc<dyn LockTransport>) -> Self {
        Self { transport }
    }

    /// Requests the exclusive lease.
    pub async fn acquire(&self, candidate: &str) -> LockResult<LockAck> {
        let Some(process_id) = validated(candidate, "acquire") else {
            return Ok(LockAck::Skipped);
        };

        match self.transport.acquire(&process_id).await {
            Ok(()) => Ok(LockAck::Applied),
            Err(error) => {
                log_failure(&process_id, "acquire", &error);
                Err(error)
            }
        }
    }

    /// Releases the lease; failures are logged and reported as data.
    pub async fn release(&self, candidate: &str) -> ReleaseOutcome {
        let Some(process_id) = validated(candidate, "release") else {
            return ReleaseOutcome::Skipped;
        };

        match self.transport.release(&process_id).await {
            Ok(()) => ReleaseOutcome::Released,
            Err(error) => {
                warn!(process_id = %process_id, error = %error, "process lock release failed");
                ReleaseOutcome::Failed
            }
        }
    }

    /// Renews the lease and reports failures to the caller.
    pub async fn heartbeat(&self, candidate: &str) -> LockResult<LockAck> {
        let Some(process_id) = validated(candidate, "heartbeat") else {
            return Ok(LockAck::Skipped);
        };

        match self.transport.heartbeat(&process_id).await {
            Ok(()) => Ok(LockAck::Applied),
            Err(error) => {
                log_failure(&process_id, "heartbeat", &error);
                Err(error)
            }
        }
    }

    /// Renews the lease without surfacing failures; the outcome says what happened.
    pub async fn heartbeat_quietly(&self, candidate: &str) -> HeartbeatOutcome {
        let Some(process_id) = validated(candidate, "heartbeat") else {
            return HeartbeatOutcome::Skipped;
        };

        let outcome = HeartbeatOutcome::from_result(
            self.transport
                .heartbeat(&process_id)
                .await
                .map(|()| LockAck::Applied),
        );
        if let HeartbeatOutcome::LeaseLost(error) | HeartbeatOutcome::Retryable(error) = &outcome
        {
            debug!(process_id = %process_id, error = %error, "quiet heartbeat failed");
        }

        outcome
    }
}

fn validated(candidate: &str, operation: &'static str) -> Option<ProcessId> {
    let process_id = ProcessId::parse(candidate);
    if process_id.is_none() {
        debug!(candidate, operation, "invalid process id, lock call skipped");
    }

    process_id
}

fn log_failure(process_id: &ProcessId, operation: &'static str, error: &LockError) {
    match error {
        LockError::Conflict { holder } => debug!(
            process_id = %process_id,
            operation,
            holder = holder.as_deref().unwrap_or_default(),
            "process lock held elsewhere"
        ),
        LockError::Unauthorized(_) => warn!(
            process_id = %process_id,
            operation,
            error = %error,
            "lock service rejected credentials"
        ),
        LockError::Transport(_) => warn!(
            process_id = %process_id,
            operation,
            error = %error,
            "lock service call failed"
        ),
    }
}
