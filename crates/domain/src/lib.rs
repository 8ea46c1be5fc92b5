//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod lease;
mod lock_record;
mod process;

pub use lease::{
    HeartbeatOutcome, HeartbeatPhase, LeaseSnapshot, LockAck, ReleaseOutcome, UNKNOWN_HOLDER,
};
pub use lock_record::{LockAvailability, LockRecord};
pub use process::ProcessId;
