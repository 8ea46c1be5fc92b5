use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use weighbridge_core::{AppError, AppResult, UserIdentity};
use weighbridge_domain::{LockAvailability, LockRecord, ProcessId};

use crate::lock_arbiter_ports::LockRecordRepository;
use crate::test_support::REFERENCE_PROCESS_ID;

use super::{AcquireDecision, LockArbiterService, MAX_LOCK_TTL_MINUTES};

#[derive(Default)]
struct FakeLockRecordRepository {
    records: Mutex<HashMap<ProcessId, LockRecord>>,
}

impl FakeLockRecordRepository {
    async fn seed(&self, record: LockRecord) {
        self.records.lock().await.insert(record.process_id(), record);
    }

    async fn stored(&self, process_id: ProcessId) -> Option<LockRecord> {
        self.records.lock().await.get(&process_id).cloned()
    }
}

#[async_trait]
impl LockRecordRepository for FakeLockRecordRepository {
    async fn find_lock(&self, process_id: ProcessId) -> AppResult<Option<LockRecord>> {
        Ok(self.stored(process_id).await)
    }

    async fn save_lock(&self, record: LockRecord) -> AppResult<()> {
        self.seed(record).await;
        Ok(())
    }

    async fn clear_lock(&self, process_id: ProcessId) -> AppResult<()> {
        self.records.lock().await.remove(&process_id);
        Ok(())
    }
}

fn process_id() -> ProcessId {
    let Some(process_id) = ProcessId::parse(REFERENCE_PROCESS_ID) else {
        panic!("reference identifier must parse");
    };
    process_id
}

fn ana() -> UserIdentity {
    UserIdentity::new("ana", "Ana", Some("ana@example.com".to_owned()))
}

fn luis() -> UserIdentity {
    UserIdentity::new("luis", "Luis", None)
}

fn service(repository: &Arc<FakeLockRecordRepository>) -> LockArbiterService {
    match LockArbiterService::new(repository.clone(), 10) {
        Ok(service) => service,
        Err(error) => panic!("service should build: {error}"),
    }
}

fn claim(owner: &UserIdentity, minutes_ago: i64) -> LockRecord {
    LockRecord::new(
        process_id(),
        owner.subject(),
        owner.holder_label(),
        Utc::now() - Duration::minutes(minutes_ago),
    )
}

#[test]
fn zero_ttl_is_rejected() {
    let repository = Arc::new(FakeLockRecordRepository::default());
    let result = LockArbiterService::new(repository, 0);

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn oversized_ttl_is_rejected_instead_of_overflowing() {
    for ttl_minutes in [MAX_LOCK_TTL_MINUTES + 1, i64::MAX / 60, i64::MAX] {
        let repository = Arc::new(FakeLockRecordRepository::default());
        let result = LockArbiterService::new(repository, ttl_minutes);

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    let repository = Arc::new(FakeLockRecordRepository::default());
    let longest = LockArbiterService::new(repository, MAX_LOCK_TTL_MINUTES);
    assert!(longest.is_ok_and(|service| service.ttl_minutes() == MAX_LOCK_TTL_MINUTES));
}

#[tokio::test]
async fn free_process_is_granted_and_reported_taken() {
    let repository = Arc::new(FakeLockRecordRepository::default());
    let service = service(&repository);

    let decision = service.acquire(&ana(), process_id()).await;
    assert!(matches!(decision, Ok(AcquireDecision::Granted(_))));

    let status = service.status(process_id()).await;
    let Ok(status) = status else {
        panic!("status should load");
    };
    assert_eq!(status.lock_state, LockAvailability::Taken);
    assert_eq!(status.locked_by.as_deref(), Some("ana@example.com"));
}

#[tokio::test]
async fn live_claim_of_another_operator_is_reported() {
    let repository = Arc::new(FakeLockRecordRepository::default());
    repository.seed(claim(&ana(), 2)).await;
    let service = service(&repository);

    let decision = service.acquire(&luis(), process_id()).await;

    let Ok(AcquireDecision::HeldByOther(record)) = decision else {
        panic!("claim should stay with ana");
    };
    assert_eq!(record.owner_label(), "ana@example.com");
}

#[tokio::test]
async fn expired_claim_can_be_taken_over() {
    let repository = Arc::new(FakeLockRecordRepository::default());
    repository.seed(claim(&ana(), 11)).await;
    let service = service(&repository);

    let decision = service.acquire(&luis(), process_id()).await;

    assert!(matches!(decision, Ok(AcquireDecision::Granted(_))));
    let stored = repository.stored(process_id()).await;
    assert!(stored.is_some_and(|record| record.is_owned_by("luis")));
}

#[tokio::test]
async fn owner_reacquire_refreshes_the_claim() {
    let repository = Arc::new(FakeLockRecordRepository::default());
    let stale = claim(&ana(), 5);
    repository.seed(stale.clone()).await;
    let service = service(&repository);

    let decision = service.acquire(&ana(), process_id()).await;

    let Ok(AcquireDecision::Granted(record)) = decision else {
        panic!("owner should keep the claim");
    };
    assert!(record.locked_at() > stale.locked_at());
}

#[tokio::test]
async fn heartbeat_renews_only_the_owner() {
    let repository = Arc::new(FakeLockRecordRepository::default());
    let stale = claim(&ana(), 5);
    repository.seed(stale.clone()).await;
    let service = service(&repository);

    let renewed = service.heartbeat(&ana(), process_id()).await;
    assert!(renewed.is_ok_and(|record| record.locked_at() > stale.locked_at()));

    let denied = service.heartbeat(&luis(), process_id()).await;
    assert!(matches!(denied, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn heartbeat_without_claim_conflicts() {
    let repository = Arc::new(FakeLockRecordRepository::default());
    let service = service(&repository);

    let result = service.heartbeat(&ana(), process_id()).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn release_is_refused_for_live_foreign_claims() {
    let repository = Arc::new(FakeLockRecordRepository::default());
    repository.seed(claim(&ana(), 1)).await;
    let service = service(&repository);

    let result = service.release(&luis(), process_id()).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(repository.stored(process_id()).await.is_some());
}

#[tokio::test]
async fn owner_admin_and_expiry_allow_release() {
    let repository = Arc::new(FakeLockRecordRepository::default());
    let service = service(&repository);

    repository.seed(claim(&ana(), 1)).await;
    assert!(service.release(&ana(), process_id()).await.is_ok());
    assert!(repository.stored(process_id()).await.is_none());

    repository.seed(claim(&ana(), 1)).await;
    let admin = luis().with_admin(true);
    assert!(service.release(&admin, process_id()).await.is_ok());

    repository.seed(claim(&ana(), 30)).await;
    assert!(service.release(&luis(), process_id()).await.is_ok());

    assert!(service.release(&luis(), process_id()).await.is_ok());
}

#[tokio::test]
async fn expired_claim_is_listed_as_available() {
    let repository = Arc::new(FakeLockRecordRepository::default());
    repository.seed(claim(&ana(), 15)).await;
    let service = service(&repository);

    let status = service.status(process_id()).await;

    let Ok(status) = status else {
        panic!("status should load");
    };
    assert_eq!(status.lock_state, LockAvailability::Available);
    assert_eq!(status.locked_by, None);
}
