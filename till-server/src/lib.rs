//! Till Server - point-of-sale backend
//!
//! # Overview
//!
//! JSON/REST backend for a small point of sale: inventory, sale lifecycle
//! with transactional stock movement, tables, settings, role-based
//! permissions, and a hash-chained audit log.
//!
//! # Module structure
//!
//! ```text
//! till-server/src/
//! ├── core/          # config, state, server loop
//! ├── auth/          # JWT, passwords, permission checks
//! ├── api/           # HTTP routes and handlers
//! ├── routes/        # router composition and middleware stack
//! ├── db/            # SQLite pool, migrations, repositories, seed
//! ├── cache/         # in-process read-through cache
//! ├── audit/         # append-only hash-chained audit sink (redb)
//! ├── printing/      # receipt rendering (ESC/POS + text)
//! └── utils/         # errors, logging, validation, money math
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod cache;
pub mod core;
pub mod db;
pub mod printing;
pub mod routes;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
  ______ ____ __    __
 /_  __//  _// /   / /
  / /   / / / /   / /
 / /  _/ / / /___/ /___
/_/  /___//_____/_____/
    "#
    );
}
