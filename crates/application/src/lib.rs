//! Application services and ports.

#![forbid(unsafe_code)]

mod heartbeat_scheduler;
mod lock_arbiter_ports;
mod lock_arbiter_service;
mod lock_client_config;
mod lock_gateway;
mod lock_ports;
mod process_lease;

#[cfg(test)]
mod test_support;

pub use heartbeat_scheduler::HeartbeatScheduler;
pub use lock_arbiter_ports::LockRecordRepository;
pub use lock_arbiter_service::{
    AcquireDecision, DEFAULT_LOCK_TTL_MINUTES, LockArbiterService, LockStatus,
    MAX_LOCK_TTL_MINUTES,
};
pub use lock_client_config::{DEFAULT_HEARTBEAT_INTERVAL, FastReleaseSupport, LockClientConfig};
pub use lock_gateway::LockGateway;
pub use lock_ports::{AccessTokenProvider, LockDenialNotifier, LockTransport, ReleaseBeacon};
pub use process_lease::{
    LeaseFactory, LeaseSlot, LeaseTeardownGuard, ProcessLease, ReleasePath, denial_message,
};
