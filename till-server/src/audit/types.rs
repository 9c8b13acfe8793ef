//! Audit log types
//!
//! Entries are immutable and append-only. A SHA-256 hash chain links each
//! entry to its predecessor so edits, deletions and reordering are
//! detectable after the fact.

use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;

/// Hash seed for the first entry in the chain.
pub const GENESIS_HASH: &str = "genesis";

/// Audited operations (enum, not free text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Void,
    LoginSuccess,
    LoginFailed,
    Logout,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Actor snapshot embedded in every entry
///
/// Copied at write time; later edits to the user row never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditActor {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&CurrentUser> for AuditActor {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

impl From<&shared::models::User> for AuditActor {
    fn from(user: &shared::models::User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

/// Audit log entry (immutable)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Monotonically increasing sequence number
    pub id: u64,
    /// Unix millis
    pub timestamp: i64,
    pub action: AuditAction,
    /// Resource family, e.g. "items", "sales"
    pub resource: String,
    pub resource_id: Option<String>,
    /// None for system events
    pub user: Option<AuditActor>,
    /// Structured details (JSON)
    pub details: serde_json::Value,
    pub ip_address: Option<String>,
    /// `curr_hash` of the previous entry
    pub prev_hash: String,
    /// SHA-256 over `prev_hash` and every stored field
    pub curr_hash: String,
}

/// Query parameters accepted by the audit endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub action: Option<AuditAction>,
    pub resource: Option<String>,
    pub resource_id: Option<String>,
    pub user_id: Option<i64>,
    pub user_role: Option<String>,
    /// Unix millis, RFC 3339, or bare `YYYY-MM-DD` (midnight UTC); inclusive
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            action: None,
            resource: None,
            resource_id: None,
            user_id: None,
            user_role: None,
            start_date: None,
            end_date: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

impl AuditQuery {
    pub fn start_millis(&self) -> Option<i64> {
        self.start_date.as_deref().and_then(parse_date_param)
    }

    pub fn end_millis(&self) -> Option<i64> {
        self.end_date.as_deref().and_then(parse_date_param)
    }

    /// Predicate applied while scanning the store.
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(action) = self.action
            && entry.action != action
        {
            return false;
        }
        if let Some(ref resource) = self.resource
            && entry.resource != *resource
        {
            return false;
        }
        if let Some(ref id) = self.resource_id
            && entry.resource_id.as_deref() != Some(id.as_str())
        {
            return false;
        }
        if let Some(user_id) = self.user_id
            && entry.user.as_ref().map(|u| u.id) != Some(user_id)
        {
            return false;
        }
        if let Some(ref role) = self.user_role
            && entry.user.as_ref().map(|u| u.role.as_str()) != Some(role.as_str())
        {
            return false;
        }
        if let Some(start) = self.start_millis()
            && entry.timestamp < start
        {
            return false;
        }
        if let Some(end) = self.end_millis()
            && entry.timestamp > end
        {
            return false;
        }
        true
    }
}

fn parse_date_param(s: &str) -> Option<i64> {
    if let Ok(millis) = s.parse::<i64>() {
        return Some(millis);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Page slice plus bookkeeping for the client's pager
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: usize,
    pub limit: usize,
    pub pages: u64,
}

/// Audit query response
#[derive(Debug, Serialize)]
pub struct AuditListResponse {
    pub logs: Vec<AuditEntry>,
    pub pagination: Pagination,
}

impl AuditListResponse {
    pub fn new(logs: Vec<AuditEntry>, total: u64, page: usize, limit: usize) -> Self {
        let pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit as u64)
        };
        Self {
            logs,
            pagination: Pagination {
                total,
                page,
                limit,
                pages,
            },
        }
    }
}

/// Result of walking the whole chain
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditChainVerification {
    pub total_entries: u64,
    pub chain_intact: bool,
    pub breaks: Vec<AuditChainBreak>,
}

/// A point where the stored chain and the recomputed chain disagree
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditChainBreak {
    pub entry_id: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: AuditAction, resource: &str, user_id: i64, timestamp: i64) -> AuditEntry {
        AuditEntry {
            id: 1,
            timestamp,
            action,
            resource: resource.to_string(),
            resource_id: Some("7".to_string()),
            user: Some(AuditActor {
                id: user_id,
                name: "Jo".to_string(),
                email: "jo@example.com".to_string(),
                role: "CASHIER".to_string(),
            }),
            details: serde_json::json!({}),
            ip_address: None,
            prev_hash: GENESIS_HASH.to_string(),
            curr_hash: String::new(),
        }
    }

    #[test]
    fn test_query_matches_filters() {
        let e = entry(AuditAction::Create, "items", 3, 1_000);

        let mut q = AuditQuery::default();
        assert!(q.matches(&e));

        q.action = Some(AuditAction::Delete);
        assert!(!q.matches(&e));
        q.action = Some(AuditAction::Create);
        assert!(q.matches(&e));

        q.user_id = Some(4);
        assert!(!q.matches(&e));
        q.user_id = Some(3);
        q.resource = Some("sales".to_string());
        assert!(!q.matches(&e));
    }

    #[test]
    fn test_query_date_bounds_inclusive() {
        let e = entry(AuditAction::Update, "items", 3, 5_000);

        let q = AuditQuery {
            start_date: Some("5000".to_string()),
            end_date: Some("5000".to_string()),
            ..Default::default()
        };
        assert!(q.matches(&e));

        let q = AuditQuery {
            start_date: Some("5001".to_string()),
            ..Default::default()
        };
        assert!(!q.matches(&e));
    }

    #[test]
    fn test_parse_date_param_formats() {
        assert_eq!(parse_date_param("1700000000000"), Some(1_700_000_000_000));
        assert_eq!(
            parse_date_param("1970-01-02"),
            Some(24 * 60 * 60 * 1000)
        );
        assert_eq!(
            parse_date_param("1970-01-01T00:00:01Z"),
            Some(1_000)
        );
        assert_eq!(parse_date_param("not a date"), None);
    }

    #[test]
    fn test_pagination_page_count() {
        let resp = AuditListResponse::new(vec![], 41, 1, 20);
        assert_eq!(resp.pagination.pages, 3);

        let resp = AuditListResponse::new(vec![], 40, 1, 20);
        assert_eq!(resp.pagination.pages, 2);

        let resp = AuditListResponse::new(vec![], 0, 1, 20);
        assert_eq!(resp.pagination.pages, 0);
    }

    #[test]
    fn test_action_serializes_snake_case() {
        let json = serde_json::to_string(&AuditAction::LoginFailed).unwrap();
        assert_eq!(json, "\"login_failed\"");
    }
}
