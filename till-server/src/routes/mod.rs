//! HTTP route composition
//!
//! Merges the `api::*` module routers and applies the middleware stack.
//! Layer order matters: `require_auth` is outermost so `CurrentUser` is in
//! the extensions before anything else runs; request ids are set before
//! tracing so spans carry them.

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api;
use crate::auth::require_auth;
use crate::core::ServerState;

mod logging;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All module routers merged; no middleware, no state.
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(api::health::router())
        .merge(api::auth::router())
        .merge(api::items::router())
        .merge(api::categories::router())
        .merge(api::tables::router())
        .merge(api::payment_methods::router())
        .merge(api::sales::router())
        .merge(api::users::router())
        .merge(api::settings::router())
        .merge(api::audit::router())
}

/// Fully configured application: routes, middleware, state.
pub fn router(state: ServerState) -> Router {
    build_router()
        // CORS - handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Gzip compress responses
        .layer(CompressionLayer::new())
        // One start/completion line per request, leveled by status class
        .layer(axum_middleware::from_fn(logging::logging_middleware))
        // Request tracing (spans at INFO)
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        // JWT authentication - skips public routes internally
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::db::seed;

    async fn test_app() -> (Router, ServerState) {
        let state = ServerState::for_tests().await;
        seed::run(&state.db.pool, &state.config)
            .await
            .expect("seed test database");
        (router(state.clone()), state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_bearer(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn login_admin(app: &Router, state: &ServerState) -> String {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/auth/login",
                serde_json::json!({
                    "email": state.config.admin_email,
                    "password": state.config.admin_password,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        body["token"].as_str().expect("token in body").to_string()
    }

    #[tokio::test]
    async fn test_health_and_branding_are_public() {
        let (app, _state) = test_app().await;

        let health = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(body_json(health).await["status"], "ok");

        let branding = app.oneshot(get("/api/branding")).await.unwrap();
        assert_eq!(branding.status(), StatusCode::OK);
        let body = body_json(branding).await;
        assert!(body["appName"].is_string());
    }

    #[tokio::test]
    async fn test_api_rejects_missing_and_garbage_tokens() {
        let (app, _state) = test_app().await;

        let response = app.clone().oneshot(get("/api/items")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(get_bearer("/api/items", "not-a-jwt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_then_list_items() {
        let (app, state) = test_app().await;
        let token = login_admin(&app, &state).await;

        let response = app
            .oneshot(get_bearer("/api/items", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["items"].is_array());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let (app, state) = test_app().await;

        let response = app
            .oneshot(post_json(
                "/api/auth/login",
                serde_json::json!({
                    "email": state.config.admin_email,
                    "password": "wrong-password",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_item_create_invalidates_cached_list() {
        let (app, state) = test_app().await;
        let token = login_admin(&app, &state).await;

        let category = crate::db::repository::category::create(
            &state.db.pool,
            shared::models::CategoryCreate {
                name: "Drinks".into(),
                description: None,
            },
        )
        .await
        .unwrap();

        // Prime the cached list
        let response = app
            .clone()
            .oneshot(get_bearer("/api/items", &token))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["items"].as_array().unwrap().len(), 0);

        let mut request = post_json(
            "/api/items",
            serde_json::json!({
                "name": "Espresso",
                "price": 2.0,
                "stock": 10,
                "categoryId": category.id,
            }),
        );
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // The mutation invalidated the prefix, so the next read sees it
        let response = app
            .oneshot(get_bearer("/api/items", &token))
            .await
            .unwrap();
        let items = body_json(response).await["items"].clone();
        assert_eq!(items.as_array().unwrap().len(), 1);
        assert_eq!(items[0]["name"], "Espresso");
    }

    #[tokio::test]
    async fn test_admin_routes_reject_cashier() {
        let (app, state) = test_app().await;

        let hash = crate::auth::hash_password("cashier-pass").unwrap();
        let cashier = crate::db::repository::user::create(
            &state.db.pool,
            "Cashier",
            "cashier@example.com",
            &hash,
            shared::models::ROLE_CASHIER,
        )
        .await
        .unwrap();
        let token = state.jwt.generate_token(&cashier).unwrap();

        let response = app
            .clone()
            .oneshot(get_bearer("/api/users", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(get_bearer("/api/audit", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_permission_guard_denies_cashier_item_create() {
        let (app, state) = test_app().await;

        let hash = crate::auth::hash_password("cashier-pass").unwrap();
        let cashier = crate::db::repository::user::create(
            &state.db.pool,
            "Cashier",
            "cashier2@example.com",
            &hash,
            shared::models::ROLE_CASHIER,
        )
        .await
        .unwrap();
        let token = state.jwt.generate_token(&cashier).unwrap();

        // Matrix allows viewing
        let response = app
            .clone()
            .oneshot(get_bearer("/api/items", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // But not creating
        let mut request = post_json(
            "/api/items",
            serde_json::json!({ "name": "Coffee", "price": 2.5, "categoryId": 1 }),
        );
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
