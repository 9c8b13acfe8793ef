//! Auth API module
//!
//! `/api/auth/login` is public; the remaining routes run behind
//! `require_auth` like every other `/api/` path.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/login", post(handler::login))
        .route("/logout", post(handler::logout))
        .route("/me", get(handler::me))
        .route("/permissions", get(handler::permissions))
}
