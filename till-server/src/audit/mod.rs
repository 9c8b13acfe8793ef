//! Audit log
//!
//! Append-only record of sensitive operations in its own redb file:
//!
//! ```text
//! handler → audit_log! → AuditService::log → mpsc → AuditWorker → AuditStorage
//! ```
//!
//! Every entry carries a SHA-256 hash chained to its predecessor
//! (genesis → entry₁ → … → entryₙ); `verify_chain` recomputes the whole
//! chain to surface edits, deletions and reordering. Logging is best
//! effort by contract: the primary mutation has already committed when the
//! entry is queued, and a full channel or failed append never rolls it
//! back or delays the response.

pub mod service;
pub mod storage;
pub mod types;
pub mod worker;

pub use service::{AuditLogRequest, AuditService};
pub use storage::{AuditStorage, AuditStorageError};
pub use types::{
    AuditAction, AuditActor, AuditChainBreak, AuditChainVerification, AuditEntry,
    AuditListResponse, AuditQuery, GENESIS_HASH,
};
pub use worker::AuditWorker;

/// Queue an audit entry attributed to the current user.
///
/// Expands to a plain `AuditService::log` call; the trailing details value
/// defaults to an empty JSON object.
#[macro_export]
macro_rules! audit_log {
    ($state:expr, $action:expr, $resource:expr, $resource_id:expr, $user:expr, $ip:expr) => {
        $crate::audit_log!(
            $state,
            $action,
            $resource,
            $resource_id,
            $user,
            $ip,
            ::serde_json::json!({})
        )
    };
    ($state:expr, $action:expr, $resource:expr, $resource_id:expr, $user:expr, $ip:expr, $details:expr) => {
        $state.audit.log(
            $action,
            $resource,
            $resource_id,
            Some($crate::audit::AuditActor::from($user)),
            $details,
            $ip,
        )
    };
}
