use async_trait::async_trait;
use weighbridge_core::AppResult;
use weighbridge_domain::{LockRecord, ProcessId};

/// Persistence port for server-side process locks.
#[async_trait]
pub trait LockRecordRepository: Send + Sync {
    /// Returns the stored claim for a process, expired or not.
    async fn find_lock(&self, process_id: ProcessId) -> AppResult<Option<LockRecord>>;

    /// Stores a claim, replacing any previous one for the same process.
    async fn save_lock(&self, record: LockRecord) -> AppResult<()>;

    /// Removes the claim for a process. Removing a missing claim succeeds.
    async fn clear_lock(&self, process_id: ProcessId) -> AppResult<()>;
}
