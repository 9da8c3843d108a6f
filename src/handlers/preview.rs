use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::sanitizer::Sanitizer;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub html: String,
}

/// Live preview for the editor: returns exactly what readers would see.
pub async fn preview(
    State(sanitizer): State<Arc<Sanitizer>>,
    Json(payload): Json<PreviewRequest>,
) -> impl IntoResponse {
    Json(PreviewResponse {
        html: sanitizer.sanitize(&payload.html),
    })
}
