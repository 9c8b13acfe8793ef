use std::path::PathBuf;

use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment variables
///
/// Every field can be overridden through the environment:
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | TILL_WORK_DIR | ./data | Work directory (databases, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| production |
/// | JWT_SECRET | dev default | Token signing key (min 32 chars) |
/// | JWT_EXPIRATION_MINUTES | 1440 | Token lifetime |
/// | TILL_ADMIN_EMAIL | admin@example.com | Bootstrap admin email |
/// | TILL_ADMIN_PASSWORD | admin123 | Bootstrap admin password |
/// | RUST_LOG | info | Log filter |
///
/// # Example
///
/// ```ignore
/// TILL_WORK_DIR=/var/lib/till HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding `database/` and `logs/`
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | production
    pub environment: String,
    /// Bootstrap admin account, used only when the users table is empty
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("TILL_WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::from_env(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            admin_email: std::env::var("TILL_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@example.com".into()),
            admin_password: std::env::var("TILL_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin123".into()),
        }
    }

    /// Override the work directory and port, keeping everything else from
    /// the environment.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Create the work directory layout (`database/`, `logs/`) if missing.
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    /// Directory for the SQLite and redb database files
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// SQLite database file path
    pub fn sqlite_path(&self) -> PathBuf {
        self.database_dir().join("till.db")
    }

    /// Audit store (redb) file path
    pub fn audit_path(&self) -> PathBuf {
        self.database_dir().join("audit.redb")
    }

    /// Directory for rotating log files
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
