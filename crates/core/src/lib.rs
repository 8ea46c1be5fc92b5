//! Shared primitives for all Rust crates in Weighbridge.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use thiserror::Error;

pub use auth::UserIdentity;

/// Result type used across Weighbridge crates.
pub type AppResult<T> = Result<T, AppError>;

/// Holder description used when a conflict is observed without a name.
pub const UNKNOWN_HOLDER: &str = "otro usuario";

/// Result type for calls against the remote process lock service.
pub type LockResult<T> = Result<T, LockError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// User is not authenticated or not allowed to access a resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure categories reported by the process lock service.
///
/// An invalid process identifier is deliberately not represented here: lock
/// calls for such identifiers are skipped, never failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// Another client holds the lease.
    #[error("process lock is held by {}", holder.as_deref().unwrap_or(UNKNOWN_HOLDER))]
    Conflict {
        /// Holder description reported by the service, when it sent one.
        holder: Option<String>,
    },

    /// Credentials were missing, invalid or expired.
    #[error("lock service rejected credentials: {0}")]
    Unauthorized(String),

    /// Network failure or unexpected response; worth retrying.
    #[error("lock service call failed: {0}")]
    Transport(String),
}

impl LockError {
    /// Returns true when the error means the local lease belief must be dropped.
    #[must_use]
    pub fn revokes_lease(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Unauthorized(_))
    }

    /// Returns the competing holder reported with a conflict.
    #[must_use]
    pub fn holder(&self) -> Option<&str> {
        match self {
            Self::Conflict { holder } => holder.as_deref(),
            Self::Unauthorized(_) | Self::Transport(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LockError, UNKNOWN_HOLDER};

    #[test]
    fn conflict_and_unauthorized_revoke_the_lease() {
        assert!(
            LockError::Conflict {
                holder: Some("ana@example.com".to_owned())
            }
            .revokes_lease()
        );
        assert!(LockError::Unauthorized("expired token".to_owned()).revokes_lease());
        assert!(!LockError::Transport("connection reset".to_owned()).revokes_lease());
    }

    #[test]
    fn conflict_message_names_the_holder_when_known() {
        let named = LockError::Conflict {
            holder: Some("ana@example.com".to_owned()),
        };
        let anonymous = LockError::Conflict { holder: None };

        assert_eq!(named.holder(), Some("ana@example.com"));
        assert!(named.to_string().contains("ana@example.com"));
        assert_eq!(
            anonymous.to_string(),
            format!("process lock is held by {UNKNOWN_HOLDER}")
        );
    }
}
