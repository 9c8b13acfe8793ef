//! API route modules
//!
//! # Structure
//!
//! - [`health`] - liveness check
//! - [`auth`] - login, logout, current user, permission rows
//! - [`items`] - inventory items
//! - [`categories`] - item categories
//! - [`tables`] - dining tables
//! - [`payment_methods`] - payment methods
//! - [`sales`] - sale lifecycle and receipts
//! - [`users`] - user administration (admin)
//! - [`settings`] - settings singleton, branding, roles
//! - [`audit`] - audit log queries (admin)
//!
//! Each module exposes `router()` returning a `Router<ServerState>` nested
//! at its `/api/<resource>` path; `crate::routes::router` merges them and
//! applies the middleware stack.

pub mod audit;
pub mod auth;
pub mod categories;
pub mod health;
pub mod items;
pub mod payment_methods;
pub mod sales;
pub mod settings;
pub mod tables;
pub mod users;

use axum::http::HeaderMap;
use serde::Serialize;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// `{"message": "..."}` body for delete/logout/reset responses.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Client IP for audit entries: first `x-forwarded-for` hop, else loopback.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn test_client_ip_falls_back_to_loopback() {
        assert_eq!(client_ip(&HeaderMap::new()), "127.0.0.1");
    }
}
