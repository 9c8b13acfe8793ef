//! Local demo - drive the till API in-process, no network
//!
//! Boots full server state over a throwaway work directory, then walks the
//! JSON API through Tower oneshot calls:
//! 1. health check (public)
//! 2. login as the seeded admin
//! 3. stock the menu (category + item)
//! 4. ring up a sale and watch the stock move
//! 5. render the receipt (text preview and ESC/POS bytes)
//!
//! Useful as a smoke run and as a map of the request flow.
//!
//! Run: cargo run -p till-server --example local_demo

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use till_server::core::{Config, ServerState};
use till_server::{db, init_logger, routes};
use tower::ServiceExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger("info", false)?;

    println!("=== Till Local Demo ===\n");

    // === 1. Boot over a throwaway work directory ===
    println!("1. Initializing ServerState...");

    let work_dir = std::env::temp_dir().join("till-local-demo");
    std::fs::create_dir_all(&work_dir)?;

    let config = Config::with_overrides(work_dir.to_string_lossy(), 0);
    let state = ServerState::initialize(&config).await;
    db::seed::run(&state.db.pool, &state.config).await?;

    let app = routes::router(state);
    println!("   ServerState initialized.\n");

    // === 2. Health check (no token needed) ===
    println!("2. Health check...");
    let (status, body) = call(&app, get("/health", None)?).await?;
    println!("   {} {}\n", status, String::from_utf8_lossy(&body));

    // === 3. Login as the seeded admin ===
    println!("3. Logging in as {}...", config.admin_email);
    let login = call_json(
        &app,
        post_json(
            "/api/auth/login",
            None,
            &json!({
                "email": config.admin_email,
                "password": config.admin_password,
            }),
        )?,
    )
    .await?;
    let token = login["token"]
        .as_str()
        .ok_or("login returned no token")?
        .to_string();
    println!("   Token acquired.\n");

    // === 4. Stock the menu ===
    println!("4. Stocking the menu...");
    let category = call_json(
        &app,
        post_json("/api/categories", Some(&token), &json!({ "name": "Drinks" }))?,
    )
    .await?;
    let category_id = category["category"]["id"]
        .as_i64()
        .ok_or("category id missing")?;

    let item = call_json(
        &app,
        post_json(
            "/api/items",
            Some(&token),
            &json!({
                "name": "Flat White",
                "price": 3.5,
                "stock": 25,
                "categoryId": category_id,
            }),
        )?,
    )
    .await?;
    let item_id = item["item"]["id"].as_i64().ok_or("item id missing")?;
    println!("   Category #{category_id} and item #{item_id} ready.\n");

    // === 5. Ring up a sale ===
    println!("5. Ringing up a sale (2x Flat White)...");
    let sale = call_json(
        &app,
        post_json(
            "/api/sales",
            Some(&token),
            &json!({
                "items": [{ "itemId": item_id, "quantity": 2, "price": 3.5 }],
                "total": 7.0,
            }),
        )?,
    )
    .await?;
    let sale_id = sale["sale"]["id"].as_i64().ok_or("sale id missing")?;

    let item = call_json(&app, get(&format!("/api/items/{item_id}"), Some(&token))?).await?;
    println!(
        "   Sale #{sale_id} completed, stock now {}.\n",
        item["item"]["stock"]
    );

    // === 6. Render the receipt ===
    println!("6. Rendering the receipt...\n");
    let (_, body) = call(
        &app,
        get(
            &format!("/api/sales/{sale_id}/receipt?format=text"),
            Some(&token),
        )?,
    )
    .await?;
    println!("{}", String::from_utf8_lossy(&body));

    let (_, body) = call(
        &app,
        get(&format!("/api/sales/{sale_id}/receipt"), Some(&token))?,
    )
    .await?;
    println!("   ESC/POS render: {} bytes\n", body.len());

    println!("=== Demo Complete ===");
    println!("\nKey points:");
    println!("  - Tower oneshot drives the real router, zero network overhead");
    println!("  - Stock moves inside the sale transaction");
    println!("  - Receipts render from the stored sale, text or ESC/POS");

    Ok(())
}

fn get(uri: &str, token: Option<&str>) -> Result<Request<Body>, axum::http::Error> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty())
}

fn post_json(
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Result<Request<Body>, axum::http::Error> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string()))
}

/// Send a request against the router, returning status and raw body.
async fn call(
    app: &Router,
    request: Request<Body>,
) -> Result<(StatusCode, Vec<u8>), Box<dyn std::error::Error>> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let body = response.into_body().collect().await?.to_bytes().to_vec();
    Ok((status, body))
}

/// Send a request, failing loudly on a non-2xx status.
async fn call_json(
    app: &Router,
    request: Request<Body>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let uri = request.uri().clone();
    let (status, body) = call(app, request).await?;
    if !status.is_success() {
        return Err(format!("{uri}: {status} {}", String::from_utf8_lossy(&body)).into());
    }
    Ok(serde_json::from_slice(&body)?)
}
