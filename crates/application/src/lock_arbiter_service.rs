//! Server-side arbitration of process locks.
//!
//! A claim is free when absent, or when it was not renewed within the TTL.
//! Owners renew by heartbeat; anyone may take an expired claim.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;
use weighbridge_core::{AppError, AppResult, UserIdentity};
use weighbridge_domain::{LockAvailability, LockRecord, ProcessId};

use crate::lock_arbiter_ports::LockRecordRepository;

#[cfg(test)]
mod tests;

/// Default time a claim survives without heartbeats.
pub const DEFAULT_LOCK_TTL_MINUTES: i64 = 10;

/// Longest claim TTL accepted, one week.
pub const MAX_LOCK_TTL_MINUTES: i64 = 7 * 24 * 60;

/// Result of a lock request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireDecision {
    /// The caller now owns the claim.
    Granted(LockRecord),
    /// Someone else owns a live claim.
    HeldByOther(LockRecord),
}

/// Lock state of a process as listed to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    /// Whether the process can be claimed.
    pub lock_state: LockAvailability,
    /// Owner description of a live claim.
    pub locked_by: Option<String>,
    /// When the live claim was taken or last renewed.
    pub locked_at: Option<DateTime<Utc>>,
}

/// Application service deciding who may edit a process.
#[derive(Clone)]
pub struct LockArbiterService {
    repository: Arc<dyn LockRecordRepository>,
    ttl: Duration,
    mutations: Arc<Mutex<()>>,
}

impl LockArbiterService {
    /// Creates a lock arbiter with the given claim TTL.
    pub fn new(repository: Arc<dyn LockRecordRepository>, ttl_minutes: i64) -> AppResult<Self> {
        if !(1..=MAX_LOCK_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(AppError::Validation(format!(
                "lock ttl must be between 1 and {MAX_LOCK_TTL_MINUTES} minutes, got {ttl_minutes}"
            )));
        }
        let ttl = Duration::try_minutes(ttl_minutes).ok_or_else(|| {
            AppError::Validation(format!("lock ttl of {ttl_minutes} minutes is out of range"))
        })?;

        Ok(Self {
            repository,
            ttl,
            mutations: Arc::new(Mutex::new(())),
        })
    }

    /// Returns the claim TTL in whole minutes.
    #[must_use]
    pub fn ttl_minutes(&self) -> i64 {
        self.ttl.num_minutes()
    }

    /// Takes the claim when it is free, expired or already the caller's.
    pub async fn acquire(
        &self,
        actor: &UserIdentity,
        process_id: ProcessId,
    ) -> AppResult<AcquireDecision> {
        let _mutation = self.mutations.lock().await;
        let now = Utc::now();

        if let Some(existing) = self.repository.find_lock(process_id).await? {
            if !existing.is_owned_by(actor.subject()) && !existing.is_expired(now, self.ttl) {
                info!(
                    process_id = %process_id,
                    subject = %actor.subject(),
                    locked_by = %existing.owner_label(),
                    "LOCK_DENIED"
                );
                return Ok(AcquireDecision::HeldByOther(existing));
            }
        }

        let record = LockRecord::new(process_id, actor.subject(), actor.holder_label(), now);
        self.repository.save_lock(record.clone()).await?;
        info!(process_id = %process_id, subject = %actor.subject(), "LOCK_ACQUIRED");

        Ok(AcquireDecision::Granted(record))
    }

    /// Renews the caller's claim.
    ///
    /// Fails with a conflict when the caller does not own the stored claim.
    pub async fn heartbeat(
        &self,
        actor: &UserIdentity,
        process_id: ProcessId,
    ) -> AppResult<LockRecord> {
        let _mutation = self.mutations.lock().await;

        let existing = self
            .repository
            .find_lock(process_id)
            .await?
            .filter(|record| record.is_owned_by(actor.subject()))
            .ok_or_else(|| AppError::Conflict("No posees el lock o expiró.".to_owned()))?;

        let renewed = existing.renewed_at(Utc::now());
        self.repository.save_lock(renewed.clone()).await?;
        info!(process_id = %process_id, subject = %actor.subject(), "LOCK_HEARTBEAT");

        Ok(renewed)
    }

    /// Clears the claim when it is free, expired, the caller's, or the caller is an admin.
    pub async fn release(&self, actor: &UserIdentity, process_id: ProcessId) -> AppResult<()> {
        let _mutation = self.mutations.lock().await;

        if let Some(existing) = self.repository.find_lock(process_id).await? {
            let may_release = actor.is_admin()
                || existing.is_owned_by(actor.subject())
                || existing.is_expired(Utc::now(), self.ttl);
            if !may_release {
                return Err(AppError::Forbidden(
                    "No puedes liberar este proceso.".to_owned(),
                ));
            }
        }

        self.repository.clear_lock(process_id).await?;
        info!(process_id = %process_id, subject = %actor.subject(), "LOCK_RELEASED");

        Ok(())
    }

    /// Reports whether a process is available.
    pub async fn status(&self, process_id: ProcessId) -> AppResult<LockStatus> {
        let now = Utc::now();
        let live = self
            .repository
            .find_lock(process_id)
            .await?
            .filter(|record| !record.is_expired(now, self.ttl));

        Ok(match live {
            Some(record) => LockStatus {
                lock_state: LockAvailability::Taken,
                locked_by: Some(record.owner_label().to_owned()),
                locked_at: Some(record.locked_at()),
            },
            None => LockStatus {
                lock_state: LockAvailability::Available,
                locked_by: None,
                locked_at: None,
            },
        })
    }
}
