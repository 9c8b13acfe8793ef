//! Server state
//!
//! One [`ServerState`] per process, cloned into every handler. All fields
//! are shared handles, so a clone is a few Arc bumps.

use std::sync::Arc;

use crate::audit::{AuditService, AuditStorage, AuditWorker};
use crate::auth::JwtService;
use crate::cache::Cache;
use crate::core::Config;
use crate::db::DbService;

/// Capacity of the audit channel; beyond this, entries are dropped rather
/// than blocking request handlers.
const AUDIT_BUFFER_SIZE: usize = 256;

/// Shared application state
#[derive(Clone, Debug)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite pool (relational source of truth)
    pub db: DbService,
    /// In-process response cache
    pub cache: Cache,
    /// JWT token service
    pub jwt: Arc<JwtService>,
    /// Audit log service (writes go through a background worker)
    pub audit: Arc<AuditService>,
}

impl ServerState {
    /// Initialize every service, in dependency order:
    ///
    /// 1. work directory layout
    /// 2. SQLite pool + migrations
    /// 3. audit store + background worker
    /// 4. JWT service and cache
    ///
    /// # Panics
    ///
    /// Panics when a database cannot be opened; the server is useless
    /// without its stores.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let sqlite_path = config.sqlite_path();
        let db = DbService::new(&sqlite_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        let audit_storage =
            AuditStorage::open(config.audit_path()).expect("Failed to open audit store");
        let (audit, audit_rx) = AuditService::new(audit_storage.clone(), AUDIT_BUFFER_SIZE);
        tokio::spawn(AuditWorker::new(audit_storage).run(audit_rx));

        let jwt = Arc::new(JwtService::new(config.jwt.clone()));

        Self {
            config: config.clone(),
            db,
            cache: Cache::new(),
            jwt,
            audit,
        }
    }

    /// In-memory state for tests: sqlite `:memory:` pool, in-memory audit
    /// store with a live worker, and a throwaway JWT secret.
    #[cfg(test)]
    pub async fn for_tests() -> Self {
        let pool = crate::db::testing::test_pool().await;
        let audit_storage = AuditStorage::open_in_memory().expect("in-memory audit store");
        let (audit, audit_rx) = AuditService::new(audit_storage.clone(), AUDIT_BUFFER_SIZE);
        tokio::spawn(AuditWorker::new(audit_storage).run(audit_rx));

        Self {
            config: Config::default(),
            db: DbService { pool },
            cache: Cache::new(),
            jwt: Arc::new(JwtService::new(crate::auth::JwtConfig::default())),
            audit,
        }
    }
}
