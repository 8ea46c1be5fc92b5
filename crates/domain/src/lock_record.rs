//! Server-side lock records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::ProcessId;

/// Exclusive editing claim on one process, as stored by the lock service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    process_id: ProcessId,
    owner_subject: String,
    owner_label: String,
    locked_at: DateTime<Utc>,
}

impl LockRecord {
    /// Creates a lock record claimed at the given instant.
    #[must_use]
    pub fn new(
        process_id: ProcessId,
        owner_subject: impl Into<String>,
        owner_label: impl Into<String>,
        locked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            process_id,
            owner_subject: owner_subject.into(),
            owner_label: owner_label.into(),
            locked_at,
        }
    }

    /// Returns the locked process.
    #[must_use]
    pub fn process_id(&self) -> ProcessId {
        self.process_id
    }

    /// Returns the subject of the owning operator.
    #[must_use]
    pub fn owner_subject(&self) -> &str {
        self.owner_subject.as_str()
    }

    /// Returns the owner description reported to competing operators.
    #[must_use]
    pub fn owner_label(&self) -> &str {
        self.owner_label.as_str()
    }

    /// Returns when the claim was taken or last renewed.
    #[must_use]
    pub fn locked_at(&self) -> DateTime<Utc> {
        self.locked_at
    }

    /// Returns true when the given subject owns the claim.
    #[must_use]
    pub fn is_owned_by(&self, subject: &str) -> bool {
        self.owner_subject == subject
    }

    /// Returns true when the claim has not been renewed within the TTL.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.locked_at < now - ttl
    }

    /// Returns a copy renewed at the given instant.
    #[must_use]
    pub fn renewed_at(&self, now: DateTime<Utc>) -> Self {
        Self {
            locked_at: now,
            ..self.clone()
        }
    }
}

/// Availability of a process for editing, as listed to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockAvailability {
    /// Free or expired.
    #[serde(rename = "disponible")]
    Available,
    /// Claimed by someone within the TTL.
    #[serde(rename = "tomado")]
    Taken,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::LockRecord;
    use crate::ProcessId;

    #[test]
    fn record_expires_once_the_ttl_elapses() {
        let Some(process_id) = ProcessId::parse("123e4567-e89b-12d3-a456-426614174000") else {
            panic!("reference identifier must parse");
        };
        let now = Utc::now();
        let record = LockRecord::new(
            process_id,
            "ana",
            "ana@example.com",
            now - Duration::minutes(11),
        );

        assert!(record.is_expired(now, Duration::minutes(10)));
        assert!(!record.renewed_at(now).is_expired(now, Duration::minutes(10)));
        assert!(record.is_owned_by("ana"));
    }
}
