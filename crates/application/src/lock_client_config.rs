use std::time::Duration;

use weighbridge_core::{AppError, AppResult};

/// Renewal period used when nothing else is configured.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Environment capabilities that decide whether credential-less release delivery is usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FastReleaseSupport {
    /// The client runs in a secure (HTTPS) context.
    pub secure_context: bool,
    /// The client runs inside an embedded desktop shell that cannot deliver beacons.
    pub embedded_shell: bool,
}

impl FastReleaseSupport {
    /// Returns true when a beacon release may be attempted.
    #[must_use]
    pub fn allows_beacon(&self) -> bool {
        self.secure_context && !self.embedded_shell
    }
}

/// Construction-time configuration of one client lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockClientConfig {
    heartbeat_interval: Duration,
    fast_release: FastReleaseSupport,
}

impl LockClientConfig {
    /// Creates a configuration with the given renewal period.
    pub fn new(heartbeat_interval: Duration) -> AppResult<Self> {
        if heartbeat_interval.is_zero() {
            return Err(AppError::Validation(
                "heartbeat interval must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            heartbeat_interval,
            fast_release: FastReleaseSupport::default(),
        })
    }

    /// Sets the fast release capabilities.
    #[must_use]
    pub fn with_fast_release(mut self, fast_release: FastReleaseSupport) -> Self {
        self.fast_release = fast_release;
        self
    }

    /// Returns the renewal period.
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// Returns the fast release capabilities.
    #[must_use]
    pub fn fast_release(&self) -> FastReleaseSupport {
        self.fast_release
    }

    /// Checks that renewals arrive before the service considers the lease expired.
    pub fn ensure_renews_within(&self, server_lease_ttl: Duration) -> AppResult<()> {
        if self.heartbeat_interval >= server_lease_ttl {
            return Err(AppError::Validation(format!(
                "heartbeat interval of {}ms must be shorter than the server lease ttl of {}ms",
                self.heartbeat_interval.as_millis(),
                server_lease_ttl.as_millis()
            )));
        }

        Ok(())
    }
}

impl Default for LockClientConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            fast_release: FastReleaseSupport::default(),
        }
    }
}
