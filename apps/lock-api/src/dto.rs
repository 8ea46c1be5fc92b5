use chrono::{DateTime, Utc};
use serde::Serialize;
use weighbridge_domain::LockAvailability;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Lock granted to the caller.
#[derive(Debug, Serialize)]
pub struct LockGrantedResponse {
    pub status: &'static str,
    pub by_me: bool,
    pub ttl_min: i64,
}

/// Holder details of a live foreign lock.
#[derive(Debug, Serialize)]
pub struct LockedDetail {
    pub message: &'static str,
    pub locked_by: String,
    pub locked_at: DateTime<Utc>,
    pub ttl_min: i64,
}

/// Body of a 423 Locked response.
#[derive(Debug, Serialize)]
pub struct LockedResponse {
    pub detail: LockedDetail,
}

/// Heartbeat accepted.
#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub ok: bool,
}

/// Lock cleared.
#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    pub status: &'static str,
}

/// Availability of one process.
#[derive(Debug, Serialize)]
pub struct LockStatusResponse {
    pub process_id: String,
    pub lock_state: LockAvailability,
    pub locked_by_name: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
}
