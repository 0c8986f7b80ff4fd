use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

use stockboard_backend::app::create_app;
use stockboard_backend::db::quote_queries;
use stockboard_backend::models::DailyQuote;
use stockboard_backend::state::AppState;

/// Fresh in-memory database with the schema applied. A single connection keeps
/// every query on the same in-memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    stockboard_backend::migrate(&pool).await.unwrap();
    pool
}

pub fn app(pool: &SqlitePool) -> Router {
    create_app(AppState { pool: pool.clone() })
}

pub fn quote(code: &str, date: &str, close: f64, pe: f64, pb: f64) -> DailyQuote {
    let mut q = DailyQuote::new(code, date);
    q.code_name = Some(format!("{} Corp", code));
    q.close = Some(close);
    q.pe_ttm = Some(pe);
    q.pb_mrq = Some(pb);
    q
}

pub async fn seed(pool: &SqlitePool, quotes: &[DailyQuote]) {
    quote_queries::insert_many(pool, quotes).await.unwrap();
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}
