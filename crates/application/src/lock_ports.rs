use async_trait::async_trait;
use weighbridge_core::{AppResult, LockResult};
use weighbridge_domain::ProcessId;

/// Remote lock service port used by the client-side lease machinery.
///
/// Implementations only ever see validated identifiers; skipping invalid ones
/// is the caller's job.
#[async_trait]
pub trait LockTransport: Send + Sync {
    /// Requests the exclusive lease for one process.
    async fn acquire(&self, process_id: &ProcessId) -> LockResult<()>;

    /// Releases the lease with full authorization.
    async fn release(&self, process_id: &ProcessId) -> LockResult<()>;

    /// Renews a lease this client holds.
    async fn heartbeat(&self, process_id: &ProcessId) -> LockResult<()>;
}

/// Fire-and-forget release delivery that cannot carry bearer credentials.
///
/// Only effective when the lock service accepts ambient (cookie) credentials.
pub trait ReleaseBeacon: Send + Sync {
    /// Queues a release without waiting for it; returns false when it could not be queued.
    fn dispatch(&self, process_id: &ProcessId) -> bool;
}

/// Source of the current session token, consulted on every call since tokens rotate.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Returns the current bearer token, or `None` when no session exists.
    async fn access_token(&self) -> AppResult<Option<String>>;
}

/// User-visible channel explaining why a workflow action cannot proceed.
pub trait LockDenialNotifier: Send + Sync {
    /// Shows the explanation to the operator.
    fn explain(&self, message: &str);
}
