use tracing::debug;
use weighbridge_domain::UNKNOWN_HOLDER;

use super::ProcessLease;
use crate::lock_ports::LockDenialNotifier;

/// Builds the explanation shown when a process cannot be locked.
#[must_use]
pub fn denial_message(holder: Option<&str>) -> String {
    format!(
        "El proceso está en uso por {}.",
        holder.unwrap_or(UNKNOWN_HOLDER)
    )
}

pub(super) async fn ensure_lock_or_explain(
    lease: &ProcessLease,
    notifier: &dyn LockDenialNotifier,
) -> bool {
    if lease.has_lock() {
        return true;
    }

    if lease.resume().await {
        return true;
    }

    if lease.acquire().await {
        return true;
    }

    let holder = lease.holder();
    debug!(
        process_id = %lease.candidate(),
        holder = holder.as_deref().unwrap_or(UNKNOWN_HOLDER),
        "workflow action denied, process locked elsewhere"
    );
    notifier.explain(&denial_message(holder.as_deref()));
    false
}
