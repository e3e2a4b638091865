use axum::Json;
use serde_json::{json, Value};

pub async fn root() -> &'static str {
    "Hello, Leafwatch is running!"
}

pub async fn ping() -> Json<Value> {
    Json(json!({ "ok": true }))
}
