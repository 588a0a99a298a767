//! Liveness endpoint.
//!
//! GET /api/health

use axum::Json;
use serde_json::{Value, json};

/// GET /api/health - Report that the process is serving.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "UP",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
