use std::future::Future;
use std::sync::Arc;

use weighbridge_domain::ProcessId;

use super::{LeaseTeardownGuard, ProcessLease};
use crate::lock_client_config::LockClientConfig;
use crate::lock_gateway::LockGateway;
use crate::lock_ports::ReleaseBeacon;

/// Builds leases sharing one gateway, beacon and configuration.
#[derive(Clone)]
pub struct LeaseFactory {
    gateway: LockGateway,
    release_beacon: Option<Arc<dyn ReleaseBeacon>>,
    config: LockClientConfig,
}

impl LeaseFactory {
    /// Creates a lease factory.
    #[must_use]
    pub fn new(
        gateway: LockGateway,
        release_beacon: Option<Arc<dyn ReleaseBeacon>>,
        config: LockClientConfig,
    ) -> Self {
        Self {
            gateway,
            release_beacon,
            config,
        }
    }

    /// Creates an unlocked lease for a candidate identifier.
    #[must_use]
    pub fn lease_for(&self, candidate: Option<&str>) -> ProcessLease {
        ProcessLease::new(
            candidate,
            self.gateway.clone(),
            self.release_beacon.clone(),
            self.config,
        )
    }
}

/// The "current process" selection of one client context.
///
/// Holds at most one live lease, so two leases for the same process never
/// renew side by side. Selecting another process tears the previous lease
/// down first.
pub struct LeaseSlot {
    factory: LeaseFactory,
    current: Option<LeaseTeardownGuard>,
}

impl LeaseSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new(factory: LeaseFactory) -> Self {
        Self {
            factory,
            current: None,
        }
    }

    /// Returns the lease of the current selection.
    #[must_use]
    pub fn current(&self) -> Option<&ProcessLease> {
        self.current.as_ref().and_then(LeaseTeardownGuard::lease)
    }

    /// Makes `candidate` the current process.
    ///
    /// Re-selecting the same valid process keeps the existing lease. Any other
    /// selection disposes the previous lease (releasing it when held) before
    /// a fresh, unlocked lease is installed with `unload` as its shutdown
    /// signal.
    pub async fn select<S>(&mut self, candidate: Option<&str>, unload: S) -> ProcessLease
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let requested = ProcessId::from_candidate(candidate);
        if let Some(existing) = self.current() {
            if requested.is_some() && existing.process_id() == requested {
                return existing.clone();
            }
        }

        self.clear().await;

        let lease = self.factory.lease_for(candidate);
        self.current = Some(LeaseTeardownGuard::install(lease.clone(), unload));
        lease
    }

    /// Disposes the current lease, if any.
    pub async fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.dispose().await;
        }
    }
}
