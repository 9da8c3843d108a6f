use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::sanitizer::Sanitizer;

/// Liveness probe. Also reports which sanitizer strategy is active.
pub async fn health(State(sanitizer): State<Arc<Sanitizer>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "sanitizer": sanitizer.strategy(),
    }))
}
