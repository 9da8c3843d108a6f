// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{health, posts, preview},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Post CRUD and rendering under `/api/posts`.
/// * Editor preview under `/api/preview`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    let post_routes = Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route(
            "/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/{id}/source", get(posts::get_post_source))
        .route("/{id}/status", patch(posts::set_post_status))
        .route("/{id}/publish", post(posts::publish_post));

    Router::new()
        .route("/health", get(health::health))
        .route("/api/preview", post(preview::preview))
        .nest("/api/posts", post_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
