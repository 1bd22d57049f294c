//! Liveness handlers.

use axum::Json;
use serde_json::{json, Value};

/// GET / — greeting for the curious.
pub async fn root() -> &'static str {
    "Hello from SoloSphere Server...."
}

/// GET /health — liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
