//! Audit service
//!
//! Accepts log requests from handlers and forwards them over a bounded
//! channel to the background worker. Sending never waits: a full channel
//! drops the entry with an error log, because a slow audit disk must not
//! stall checkout.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::storage::{AuditStorage, AuditStorageResult};
use super::types::{
    AuditAction, AuditActor, AuditChainVerification, AuditListResponse, AuditQuery,
};

/// Log request forwarded to the worker
#[derive(Debug)]
pub struct AuditLogRequest {
    pub action: AuditAction,
    pub resource: String,
    pub resource_id: Option<String>,
    pub user: Option<AuditActor>,
    pub details: serde_json::Value,
    pub ip_address: Option<String>,
}

/// Audit log service
///
/// Writes go through the channel; queries read the store directly.
pub struct AuditService {
    storage: AuditStorage,
    tx: mpsc::Sender<AuditLogRequest>,
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService").finish_non_exhaustive()
    }
}

impl AuditService {
    pub fn new(
        storage: AuditStorage,
        buffer_size: usize,
    ) -> (Arc<Self>, mpsc::Receiver<AuditLogRequest>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        (Arc::new(Self { storage, tx }), rx)
    }

    /// Queue an audit entry, fire and forget.
    pub fn log(
        &self,
        action: AuditAction,
        resource: impl Into<String>,
        resource_id: Option<String>,
        user: Option<AuditActor>,
        details: serde_json::Value,
        ip_address: Option<String>,
    ) {
        let req = AuditLogRequest {
            action,
            resource: resource.into(),
            resource_id,
            user,
            details,
            ip_address,
        };

        if let Err(e) = self.tx.try_send(req) {
            tracing::error!("Audit entry dropped: {e}");
        }
    }

    pub fn query(&self, q: &AuditQuery) -> AuditStorageResult<AuditListResponse> {
        self.storage.query(q)
    }

    pub fn verify_chain(&self) -> AuditStorageResult<AuditChainVerification> {
        self.storage.verify_chain()
    }
}
