//! Authentication and authorization
//!
//! JWT authentication, password hashing, and role permissions:
//! - [`JwtService`] - token issue and validation
//! - [`CurrentUser`] - authenticated user context
//! - [`require_auth`] / [`require_admin`] - middleware
//! - [`permissions::require`] - per-handler `resource:action` guard

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
pub use password::{hash_password, verify_password};
