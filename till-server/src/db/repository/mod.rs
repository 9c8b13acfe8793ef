//! Repository Module
//!
//! CRUD over the SQLite pool as free async functions. Handlers pass
//! `&SqlitePool` in and get shared models back; multi-statement writes
//! (the sale pipeline) open their own transaction internally.

// Catalog
pub mod category;
pub mod item;

// Floor
pub mod table;

// Sales
pub mod payment_method;
pub mod sale;

// Accounts
pub mod role_permission;
pub mod user;

// System
pub mod settings;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return RepoError::Duplicate(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return RepoError::Conflict(db_err.message().to_string());
            }
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
