use axum::Json;
use fedimark_common::constants::{SYSTEM_NAME, SYSTEM_VERSION};
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": SYSTEM_NAME,
        "version": SYSTEM_VERSION,
    }))
}
