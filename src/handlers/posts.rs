use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::post::{PostFilter, PostInput, PostStatus, RenderedPost, StatusRequest},
    sanitizer::Sanitizer,
    store::DynPostStore,
};

/// Lists posts (newest first) with their content sanitized for display.
/// Optional filters: `status`, `category`, `q`.
pub async fn list_posts(
    State(store): State<DynPostStore>,
    State(sanitizer): State<Arc<Sanitizer>>,
    Query(filter): Query<PostFilter>,
) -> Result<impl IntoResponse, AppError> {
    let posts: Vec<RenderedPost> = store
        .list(&filter)
        .await?
        .into_iter()
        .map(|post| post.render(&sanitizer))
        .collect();

    Ok(Json(posts))
}

/// Creates a post from raw editor HTML. The content is stored as written
/// and sanitized whenever it is rendered.
pub async fn create_post(
    State(store): State<DynPostStore>,
    Json(payload): Json<PostInput>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id = store.create(&payload).await?;
    tracing::info!("Created post {} ({})", id, payload.status);

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Renders a published post for readers. Drafts are reported as missing.
pub async fn get_post(
    State(store): State<DynPostStore>,
    State(sanitizer): State<Arc<Sanitizer>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = store
        .get(id)
        .await?
        .filter(|post| post.status == PostStatus::Published)
        .ok_or_else(|| AppError::post_not_found(id))?;

    Ok(Json(post.render(&sanitizer)))
}

/// Returns the stored record, raw content included, for the editor.
pub async fn get_post_source(
    State(store): State<DynPostStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = store
        .get(id)
        .await?
        .ok_or_else(|| AppError::post_not_found(id))?;

    Ok(Json(post))
}

/// Replaces all editable fields of a post.
pub async fn update_post(
    State(store): State<DynPostStore>,
    Path(id): Path<i64>,
    Json(payload): Json<PostInput>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if !store.update(id, &payload).await? {
        return Err(AppError::post_not_found(id));
    }

    Ok(StatusCode::OK)
}

/// Moves a post between draft and published.
pub async fn set_post_status(
    State(store): State<DynPostStore>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !store.set_status(id, payload.status).await? {
        return Err(AppError::post_not_found(id));
    }
    tracing::info!("Post {} is now {}", id, payload.status);

    Ok(StatusCode::OK)
}

pub async fn publish_post(
    State(store): State<DynPostStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !store.set_status(id, PostStatus::Published).await? {
        return Err(AppError::post_not_found(id));
    }
    tracing::info!("Published post {}", id);

    Ok(StatusCode::OK)
}

pub async fn delete_post(
    State(store): State<DynPostStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete(id).await? {
        return Err(AppError::post_not_found(id));
    }
    tracing::info!("Deleted post {}", id);

    Ok(StatusCode::NO_CONTENT)
}
