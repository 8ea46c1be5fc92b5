use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use weighbridge_application::LockRecordRepository;
use weighbridge_core::AppResult;
use weighbridge_domain::{LockRecord, ProcessId};

/// In-memory lock record store for a single lock service instance.
#[derive(Default)]
pub struct InMemoryLockRecordRepository {
    records: RwLock<HashMap<ProcessId, LockRecord>>,
}

impl InMemoryLockRecordRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LockRecordRepository for InMemoryLockRecordRepository {
    async fn find_lock(&self, process_id: ProcessId) -> AppResult<Option<LockRecord>> {
        Ok(self.records.read().await.get(&process_id).cloned())
    }

    async fn save_lock(&self, record: LockRecord) -> AppResult<()> {
        self.records
            .write()
            .await
            .insert(record.process_id(), record);
        Ok(())
    }

    async fn clear_lock(&self, process_id: ProcessId) -> AppResult<()> {
        self.records.write().await.remove(&process_id);
        Ok(())
    }
}
