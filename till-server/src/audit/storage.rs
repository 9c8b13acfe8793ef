//! Audit log storage (redb)
//!
//! Append-only: the API offers `append`, `query` and `verify_chain` and
//! nothing else. Entries are JSON blobs keyed by sequence number in a
//! dedicated database file, separate from the relational store.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::types::{
    AuditAction, AuditActor, AuditChainBreak, AuditChainVerification, AuditEntry,
    AuditListResponse, AuditQuery, GENESIS_HASH,
};

/// key = sequence number, value = JSON-serialized AuditEntry
const ENTRIES_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("audit_entries");

/// Storage errors
#[derive(Debug, Error)]
pub enum AuditStorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AuditStorageResult<T> = Result<T, AuditStorageError>;

/// Audit log store backed by redb
#[derive(Clone)]
pub struct AuditStorage {
    db: Arc<Database>,
}

impl AuditStorage {
    /// Open or create the database at the given path.
    ///
    /// redb commits with immediate durability, so an entry that `append`
    /// returned survives power loss.
    pub fn open(path: impl AsRef<Path>) -> AuditStorageResult<Self> {
        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ENTRIES_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> AuditStorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ENTRIES_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Append one entry, extending the hash chain.
    pub fn append(
        &self,
        action: AuditAction,
        resource: String,
        resource_id: Option<String>,
        user: Option<AuditActor>,
        details: serde_json::Value,
        ip_address: Option<String>,
    ) -> AuditStorageResult<AuditEntry> {
        let timestamp = shared::util::now_millis();

        let txn = self.db.begin_write()?;
        let entry = {
            let mut table = txn.open_table(ENTRIES_TABLE)?;

            // The tail is read inside the write transaction; redb admits one
            // writer at a time, so two appends cannot allocate the same
            // sequence number.
            let (sequence, prev_hash) = match table.last()? {
                Some((key, value)) => {
                    let last: AuditEntry = serde_json::from_slice(value.value())?;
                    (key.value() + 1, last.curr_hash)
                }
                None => (1, GENESIS_HASH.to_string()),
            };

            let curr_hash = compute_entry_hash(
                &prev_hash,
                sequence,
                timestamp,
                &action,
                &resource,
                resource_id.as_deref(),
                user.as_ref(),
                &details,
                ip_address.as_deref(),
            );

            let entry = AuditEntry {
                id: sequence,
                timestamp,
                action,
                resource,
                resource_id,
                user,
                details,
                ip_address,
                prev_hash,
                curr_hash,
            };

            let value = serde_json::to_vec(&entry)?;
            table.insert(sequence, value.as_slice())?;
            entry
        };
        txn.commit()?;

        Ok(entry)
    }

    /// Filtered, paginated scan, newest first.
    ///
    /// `total` counts every match, not just the returned page.
    pub fn query(&self, q: &AuditQuery) -> AuditStorageResult<AuditListResponse> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;

        let page = q.page.max(1);
        let skip = (page - 1).saturating_mul(q.limit);

        let mut total: u64 = 0;
        let mut logs = Vec::new();
        for result in table.iter()?.rev() {
            let (_key, value) = result?;
            let entry: AuditEntry = serde_json::from_slice(value.value())?;
            if !q.matches(&entry) {
                continue;
            }
            if total as usize >= skip && logs.len() < q.limit {
                logs.push(entry);
            }
            total += 1;
        }

        Ok(AuditListResponse::new(logs, total, page, q.limit))
    }

    /// Walk the chain start to end, recomputing every hash.
    ///
    /// Detects two failure shapes: an entry whose `prev_hash` does not
    /// match its predecessor (relinked or deleted history) and an entry
    /// whose stored `curr_hash` does not match its own content (edited in
    /// place).
    pub fn verify_chain(&self) -> AuditStorageResult<AuditChainVerification> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;

        let mut total_entries: u64 = 0;
        let mut breaks = Vec::new();
        let mut expected_prev = GENESIS_HASH.to_string();

        for result in table.iter()? {
            let (_key, value) = result?;
            let entry: AuditEntry = serde_json::from_slice(value.value())?;
            total_entries += 1;

            if entry.prev_hash != expected_prev {
                breaks.push(AuditChainBreak {
                    entry_id: entry.id,
                    expected_hash: expected_prev.clone(),
                    actual_hash: entry.prev_hash.clone(),
                });
            }

            let recomputed = compute_entry_hash(
                &entry.prev_hash,
                entry.id,
                entry.timestamp,
                &entry.action,
                &entry.resource,
                entry.resource_id.as_deref(),
                entry.user.as_ref(),
                &entry.details,
                entry.ip_address.as_deref(),
            );
            if recomputed != entry.curr_hash {
                breaks.push(AuditChainBreak {
                    entry_id: entry.id,
                    expected_hash: recomputed,
                    actual_hash: entry.curr_hash.clone(),
                });
            }

            // Chain as written: a content edit surfaces at the edited entry
            // only, not at every entry after it.
            expected_prev = entry.curr_hash;
        }

        Ok(AuditChainVerification {
            total_entries,
            chain_intact: breaks.is_empty(),
            breaks,
        })
    }
}

/// SHA-256 over every stored field.
///
/// Variable-length fields are separated by `\x00`; fixed-width integers go
/// in as little-endian bytes; Option fields carry a tag byte so None and
/// `Some("")` cannot collide. The action hashes via its serde form, which
/// is stable across versions, not via Debug.
#[allow(clippy::too_many_arguments)]
fn compute_entry_hash(
    prev_hash: &str,
    id: u64,
    timestamp: i64,
    action: &AuditAction,
    resource: &str,
    resource_id: Option<&str>,
    user: Option<&AuditActor>,
    details: &serde_json::Value,
    ip_address: Option<&str>,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(prev_hash.as_bytes());
    hasher.update(b"\x00");

    hasher.update(id.to_le_bytes());
    hasher.update(timestamp.to_le_bytes());

    let action_str = serde_json::to_string(action).unwrap_or_default();
    hasher.update(action_str.as_bytes());
    hasher.update(b"\x00");

    hasher.update(resource.as_bytes());
    hasher.update(b"\x00");

    hash_optional(&mut hasher, resource_id);

    match user {
        Some(user) => {
            hasher.update(b"\x01");
            hasher.update(user.id.to_le_bytes());
            hasher.update(user.name.as_bytes());
            hasher.update(b"\x00");
            hasher.update(user.email.as_bytes());
            hasher.update(b"\x00");
            hasher.update(user.role.as_bytes());
        }
        None => {
            hasher.update(b"\x00");
        }
    }
    hasher.update(b"\x00");

    // serde_json::Value keeps object keys sorted, so this string is stable
    // across store/load round trips.
    let details_json = serde_json::to_string(details).unwrap_or_default();
    hasher.update(details_json.as_bytes());
    hasher.update(b"\x00");

    hash_optional(&mut hasher, ip_address);

    format!("{:x}", hasher.finalize())
}

/// `\x00` = None, `\x01` + bytes = Some; terminated by `\x00`
fn hash_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update(b"\x01");
            hasher.update(v.as_bytes());
        }
        None => {
            hasher.update(b"\x00");
        }
    }
    hasher.update(b"\x00");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: i64) -> AuditActor {
        AuditActor {
            id,
            name: "Jo".to_string(),
            email: "jo@example.com".to_string(),
            role: "CASHIER".to_string(),
        }
    }

    fn append_n(storage: &AuditStorage, n: usize) {
        for i in 0..n {
            storage
                .append(
                    AuditAction::Create,
                    "items".to_string(),
                    Some(i.to_string()),
                    Some(actor(1)),
                    serde_json::json!({ "n": i }),
                    Some("127.0.0.1".to_string()),
                )
                .unwrap();
        }
    }

    #[test]
    fn test_append_builds_chain() {
        let storage = AuditStorage::open_in_memory().unwrap();

        let first = storage
            .append(
                AuditAction::LoginSuccess,
                "auth".to_string(),
                None,
                Some(actor(1)),
                serde_json::json!({}),
                None,
            )
            .unwrap();
        let second = storage
            .append(
                AuditAction::Create,
                "items".to_string(),
                Some("5".to_string()),
                Some(actor(1)),
                serde_json::json!({ "name": "Coffee" }),
                Some("10.0.0.1".to_string()),
            )
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(first.prev_hash, GENESIS_HASH);
        assert_eq!(second.id, 2);
        assert_eq!(second.prev_hash, first.curr_hash);
        assert_ne!(second.curr_hash, first.curr_hash);
    }

    #[test]
    fn test_system_events_have_no_actor() {
        let storage = AuditStorage::open_in_memory().unwrap();
        let entry = storage
            .append(
                AuditAction::LoginFailed,
                "auth".to_string(),
                None,
                None,
                serde_json::json!({ "email": "ghost@example.com" }),
                Some("10.0.0.9".to_string()),
            )
            .unwrap();
        assert!(entry.user.is_none());

        let result = storage.query(&AuditQuery::default()).unwrap();
        assert_eq!(result.pagination.total, 1);
    }

    #[test]
    fn test_query_newest_first_with_pagination() {
        let storage = AuditStorage::open_in_memory().unwrap();
        append_n(&storage, 5);

        let q = AuditQuery {
            limit: 2,
            ..Default::default()
        };
        let page1 = storage.query(&q).unwrap();
        assert_eq!(page1.pagination.total, 5);
        assert_eq!(page1.pagination.pages, 3);
        assert_eq!(page1.logs.len(), 2);
        assert_eq!(page1.logs[0].id, 5);
        assert_eq!(page1.logs[1].id, 4);

        let q = AuditQuery {
            limit: 2,
            page: 3,
            ..Default::default()
        };
        let page3 = storage.query(&q).unwrap();
        assert_eq!(page3.logs.len(), 1);
        assert_eq!(page3.logs[0].id, 1);
    }

    #[test]
    fn test_query_filters_by_action_and_user() {
        let storage = AuditStorage::open_in_memory().unwrap();
        storage
            .append(
                AuditAction::Create,
                "items".to_string(),
                Some("1".to_string()),
                Some(actor(1)),
                serde_json::json!({}),
                None,
            )
            .unwrap();
        storage
            .append(
                AuditAction::Delete,
                "items".to_string(),
                Some("1".to_string()),
                Some(actor(2)),
                serde_json::json!({}),
                None,
            )
            .unwrap();

        let q = AuditQuery {
            action: Some(AuditAction::Delete),
            ..Default::default()
        };
        let result = storage.query(&q).unwrap();
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.logs[0].action, AuditAction::Delete);

        let q = AuditQuery {
            user_id: Some(1),
            ..Default::default()
        };
        let result = storage.query(&q).unwrap();
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.logs[0].action, AuditAction::Create);
    }

    #[test]
    fn test_verify_intact_chain() {
        let storage = AuditStorage::open_in_memory().unwrap();
        append_n(&storage, 4);

        let verification = storage.verify_chain().unwrap();
        assert_eq!(verification.total_entries, 4);
        assert!(verification.chain_intact);
        assert!(verification.breaks.is_empty());
    }

    #[test]
    fn test_verify_detects_in_place_edit() {
        let storage = AuditStorage::open_in_memory().unwrap();
        append_n(&storage, 3);

        // Rewrite entry 2's details while keeping its stored hashes
        let txn = storage.db.begin_write().unwrap();
        {
            let mut table = txn.open_table(ENTRIES_TABLE).unwrap();
            let mut entry: AuditEntry = {
                let guard = table.get(2u64).unwrap().unwrap();
                serde_json::from_slice(guard.value()).unwrap()
            };
            entry.details = serde_json::json!({ "n": 999 });
            let value = serde_json::to_vec(&entry).unwrap();
            table.insert(2u64, value.as_slice()).unwrap();
        }
        txn.commit().unwrap();

        let verification = storage.verify_chain().unwrap();
        assert!(!verification.chain_intact);
        assert_eq!(verification.breaks.len(), 1);
        assert_eq!(verification.breaks[0].entry_id, 2);
    }

    #[test]
    fn test_verify_detects_deleted_entry() {
        let storage = AuditStorage::open_in_memory().unwrap();
        append_n(&storage, 3);

        let txn = storage.db.begin_write().unwrap();
        {
            let mut table = txn.open_table(ENTRIES_TABLE).unwrap();
            table.remove(2u64).unwrap();
        }
        txn.commit().unwrap();

        let verification = storage.verify_chain().unwrap();
        assert!(!verification.chain_intact);
        assert_eq!(verification.breaks.len(), 1);
        assert_eq!(verification.breaks[0].entry_id, 3);
    }

    #[test]
    fn test_hash_distinguishes_none_from_empty() {
        let a = compute_entry_hash(
            GENESIS_HASH,
            1,
            0,
            &AuditAction::Create,
            "items",
            None,
            None,
            &serde_json::json!({}),
            None,
        );
        let b = compute_entry_hash(
            GENESIS_HASH,
            1,
            0,
            &AuditAction::Create,
            "items",
            Some(""),
            None,
            &serde_json::json!({}),
            None,
        );
        assert_ne!(a, b);
    }
}
