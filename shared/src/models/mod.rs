//! Data models
//!
//! Shared between the server and API clients. JSON uses camelCase field
//! names; DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod category;
pub mod item;
pub mod payment_method;
pub mod role_permission;
pub mod sale;
pub mod settings;
pub mod table;
pub mod user;

// Re-exports
pub use category::*;
pub use item::*;
pub use payment_method::*;
pub use role_permission::*;
pub use sale::*;
pub use settings::*;
pub use table::*;
pub use user::*;
