//! Shared types for the Till POS backend
//!
//! Domain models used across the server and printer crates.
//! DB row derives are feature-gated so non-server consumers stay lean.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
