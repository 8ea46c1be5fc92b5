use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{ProcessLease, ReleasePath};

/// Scope guard that gives a held lease back when its owner goes away.
///
/// While installed for a valid process, an unload listener waits for the
/// supplied shutdown signal and releases the lease when it fires. Disposing
/// or dropping the guard removes the listener, cancels renewal and releases
/// the lease. Every release here is best effort: the process may be killed
/// before it completes, in which case the server-side TTL reclaims the lock.
pub struct LeaseTeardownGuard {
    lease: Option<ProcessLease>,
    unload_listener: Option<JoinHandle<()>>,
}

impl LeaseTeardownGuard {
    /// Installs the guard, listening for `unload` when the identifier is valid.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn install<S>(lease: ProcessLease, unload: S) -> Self
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let unload_listener = lease.process_id().map(|_| {
            let listener_lease = lease.clone();
            tokio::spawn(async move {
                unload.await;
                debug!(process_id = %listener_lease.candidate(), "unload signal received");
                listener_lease.release(ReleasePath::KeepAlive).await;
            })
        });

        Self {
            lease: Some(lease),
            unload_listener,
        }
    }

    /// Returns the guarded lease.
    #[must_use]
    pub fn lease(&self) -> Option<&ProcessLease> {
        self.lease.as_ref()
    }

    /// Tears down the lease and waits for the release attempt to finish.
    pub async fn dispose(mut self) {
        self.deregister_listener();
        if let Some(lease) = self.lease.take() {
            lease.release(ReleasePath::KeepAlive).await;
        }
    }

    fn deregister_listener(&mut self) {
        if let Some(listener) = self.unload_listener.take() {
            listener.abort();
        }
    }
}

impl Drop for LeaseTeardownGuard {
    fn drop(&mut self) {
        self.deregister_listener();
        let Some(lease) = self.lease.take() else {
            return;
        };

        lease.stop_heartbeat();
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    lease.release(ReleasePath::KeepAlive).await;
                });
            }
            Err(_) => warn!(
                process_id = %lease.candidate(),
                "no async runtime available to release process lease on teardown"
            ),
        }
    }
}
