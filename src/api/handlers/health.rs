//! Health check handler.

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. No authentication, no store access.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "careconnect",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
