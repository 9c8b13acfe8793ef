//! Settings API module
//!
//! Singleton settings, the public branding subset, the role permission
//! matrix, and payment method updates.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/settings", routes())
        // Public: unauthenticated clients brand the login screen
        .route("/api/branding", get(handler::branding))
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get_settings).put(handler::update_settings))
        .route("/roles", get(handler::list_roles).put(handler::update_role))
        .route("/payment-methods/{id}", put(handler::update_payment_method))
}
